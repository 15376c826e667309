pub mod compile;
pub mod execute;
pub mod value;

pub use compile::{compile, Calldata};
pub use execute::{execute_calldata, CairoVersion, Call};
pub use value::{CairoValue, CustomEnum, RawArgs};
