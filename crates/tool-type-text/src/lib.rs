pub mod api;
pub mod errors;
pub mod model;
pub mod policy;
pub mod tempo;

mod runner;

pub use api::{TypeTextTool, TypeTextToolBuilder};
pub use errors::TypeTextError;
pub use model::{InputMode, TextParams, TextTarget};
pub use policy::{TypeDelays, TypePolicyView, TypeTimeouts};
pub use tempo::{NaturalTempo, NullTempo, TempoPort, TypingPlan, TypingStep};
