//! Event discovery.
//!
//! The contract has no event count, so discovery reads storage indices
//! `0..scan_max` one after another. Any failed read means "no event here"
//! and the scan moves on. Only a scan in which every read failed at the
//! transport level is reported as an error, since that is an unreachable
//! node rather than an empty contract.

use tracing::{debug, info, warn};

use snicket_chain::TicketContract;
use snicket_shared::gateway::is_fetchable;
use snicket_shared::listing;
use snicket_shared::{Event, EventId};

use crate::error::Result;
use crate::metadata::{image_of, MetadataSource};
use crate::Ticketing;

impl<C: TicketContract, M: MetadataSource> Ticketing<C, M> {
    /// Scan every index and collect well-formed events, in index order.
    pub async fn discover_events(&self) -> Result<Vec<Event>> {
        let mut found = Vec::new();
        let mut transport_failures = 0u64;
        let mut last_transport_error = None;

        for i in 0..self.scan_max {
            let index = EventId::from(i);
            let record = match self.contract.event(index).await {
                Ok(record) => record,
                Err(e) => {
                    debug!(%index, error = %e, "No event at index");
                    if e.is_transport() {
                        transport_failures += 1;
                        last_transport_error = Some(e);
                    }
                    continue;
                }
            };

            let mut event = record.into_event(index);
            if !event.is_well_formed() {
                debug!(%index, "Skipping malformed event record");
                continue;
            }

            event.image = self.event_image(index).await;
            found.push(event);
        }

        if transport_failures == self.scan_max {
            if let Some(e) = last_transport_error {
                warn!(error = %e, "Every event read failed, node unreachable");
                return Err(e.into());
            }
        }

        info!(
            count = found.len(),
            scanned = self.scan_max,
            transport_failures,
            "Event scan complete"
        );
        Ok(found)
    }

    /// Discovered events that are still active.
    pub async fn active_events(&self) -> Result<Vec<Event>> {
        let mut events = self.discover_events().await?;
        events.retain(|e| e.active);
        Ok(events)
    }

    /// The first few active events that still have seats.
    pub async fn featured_events(&self) -> Result<Vec<Event>> {
        let events = self.discover_events().await?;
        Ok(listing::featured(&events))
    }

    /// Artwork for an event, looked up through `tokenURI(index)`. Any failure
    /// leaves the event without an image.
    async fn event_image(&self, index: EventId) -> Option<String> {
        let uri = match self.contract.token_uri(index).await {
            Ok(uri) => uri,
            Err(e) => {
                debug!(%index, error = %e, "No token URI for event");
                return None;
            }
        };

        let url = self.gateway.resolve(&uri);
        if !is_fetchable(&url) {
            return None;
        }

        match self.metadata.fetch_json(&url).await {
            Ok(doc) => image_of(&doc).map(|img| self.gateway.resolve(img)),
            Err(e) => {
                debug!(%index, url = %url, error = %e, "Event metadata unavailable");
                None
            }
        }
    }
}
