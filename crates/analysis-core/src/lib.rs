pub mod envelope;
pub mod error;
pub mod profile;
pub mod recommendation;
pub mod symbol;
pub mod traits;
pub mod types;

pub use envelope::{AgentEnvelope, AgentStatus};
pub use error::AnalysisError;
pub use profile::*;
pub use recommendation::*;
pub use symbol::{Exchange, TickerSymbol};
pub use traits::{MarketDataProvider, Narrator, TickerAgent};
pub use types::*;
