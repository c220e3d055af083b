//! Solidity interface of the ticketing contract.
//!
//! Call encoding, return decoding and the `Transfer` topic all come from
//! this declaration.

use alloy_sol_types::sol;

sol! {
    #[derive(Debug, PartialEq, Eq)]
    interface ISnicket {
        function events(uint256 index) external view returns (
            string memory name,
            uint256 startTime,
            uint256 endTime,
            string memory preBaseURI,
            string memory postBaseURI,
            uint256 priceWei,
            uint256 maxSupply,
            uint256 minted,
            address organizer,
            bool active
        );

        function tokenEvent(uint256 tokenId) external view returns (uint256);

        function tokenURI(uint256 tokenId) external view returns (string memory);

        function ownerOf(uint256 tokenId) external view returns (address);

        function getMyTickets(address owner) external view returns (uint256[] memory);

        function buyTicket(uint256 eventId) external payable;

        function transferFrom(address from, address to, uint256 tokenId) external;

        function createEvent(
            string memory name,
            uint256 startTime,
            uint256 endTime,
            string memory preBaseURI,
            string memory postBaseURI,
            uint256 priceWei,
            uint256 maxSupply,
            address organizer
        ) external;

        event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);
    }
}
