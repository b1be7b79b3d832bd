pub mod futures;
pub mod spot;

pub use futures::FuturesService;
pub use spot::SpotService;
