pub mod buildings;
pub mod inbox;
pub mod ledger;
pub mod player;
pub mod village;
pub mod warriors;
