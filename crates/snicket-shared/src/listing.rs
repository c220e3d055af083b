//! Caller-side filtering and ordering of discovered events.

use std::cmp::Reverse;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::FEATURED_LIMIT;
use crate::types::Event;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventFilter {
    #[default]
    All,
    Available,
    SoldOut,
}

impl EventFilter {
    pub fn matches(&self, event: &Event) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::Available => !event.is_sold_out(),
            EventFilter::SoldOut => event.is_sold_out(),
        }
    }
}

impl FromStr for EventFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "available" => Ok(Self::Available),
            "sold-out" => Ok(Self::SoldOut),
            other => Err(format!("unknown filter: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventSort {
    /// Earliest start first
    #[default]
    Date,
    /// Cheapest first
    Price,
    /// Most remaining seats first
    Availability,
}

impl EventSort {
    pub fn apply(&self, events: &mut [Event]) {
        match self {
            EventSort::Date => events.sort_by_key(|e| e.start_time),
            EventSort::Price => events.sort_by_key(|e| e.price_wei),
            EventSort::Availability => events.sort_by_key(|e| Reverse(e.available_tickets())),
        }
    }
}

impl FromStr for EventSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(Self::Date),
            "price" => Ok(Self::Price),
            "availability" => Ok(Self::Availability),
            other => Err(format!("unknown sort: {other}")),
        }
    }
}

/// Filter then sort, leaving the input untouched.
pub fn arrange(events: &[Event], filter: EventFilter, sort: EventSort) -> Vec<Event> {
    let mut out: Vec<Event> = events.iter().filter(|e| filter.matches(e)).cloned().collect();
    sort.apply(&mut out);
    out
}

/// First few active events that still have seats, in scan order.
pub fn featured(events: &[Event]) -> Vec<Event> {
    events
        .iter()
        .filter(|e| e.active && !e.is_sold_out())
        .take(FEATURED_LIMIT)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::U256;

    fn event(id: u64, start: u64, price: u64, max: u64, minted: u64) -> Event {
        Event {
            id: U256::from(id),
            name: format!("event-{id}"),
            start_time: start,
            end_time: start + 100,
            price_wei: U256::from(price),
            max_supply: U256::from(max),
            minted: U256::from(minted),
            active: true,
            image: None,
        }
    }

    fn ids(events: &[Event]) -> Vec<u64> {
        events.iter().map(|e| e.id.to::<u64>()).collect()
    }

    #[test]
    fn test_sort_orders() {
        let events = vec![
            event(0, 300, 5, 10, 9),
            event(1, 100, 50, 10, 0),
            event(2, 200, 1, 10, 5),
        ];

        assert_eq!(ids(&arrange(&events, EventFilter::All, EventSort::Date)), vec![1, 2, 0]);
        assert_eq!(ids(&arrange(&events, EventFilter::All, EventSort::Price)), vec![2, 0, 1]);
        assert_eq!(
            ids(&arrange(&events, EventFilter::All, EventSort::Availability)),
            vec![1, 2, 0]
        );
    }

    #[test]
    fn test_filters() {
        let events = vec![event(0, 1, 1, 10, 10), event(1, 1, 1, 10, 2)];
        assert_eq!(ids(&arrange(&events, EventFilter::Available, EventSort::Date)), vec![1]);
        assert_eq!(ids(&arrange(&events, EventFilter::SoldOut, EventSort::Date)), vec![0]);
        assert_eq!(arrange(&events, EventFilter::All, EventSort::Date).len(), 2);
    }

    #[test]
    fn test_featured_skips_sold_out_and_inactive() {
        let mut inactive = event(1, 1, 1, 10, 0);
        inactive.active = false;
        let events = vec![
            event(0, 1, 1, 10, 10),
            inactive,
            event(2, 1, 1, 10, 0),
            event(3, 1, 1, 10, 0),
            event(4, 1, 1, 10, 0),
            event(5, 1, 1, 10, 0),
        ];
        assert_eq!(ids(&featured(&events)), vec![2, 3, 4]);
    }

    #[test]
    fn test_parse_query_values() {
        assert_eq!("sold-out".parse::<EventFilter>().unwrap(), EventFilter::SoldOut);
        assert_eq!("availability".parse::<EventSort>().unwrap(), EventSort::Availability);
        assert!("newest".parse::<EventSort>().is_err());
    }
}
