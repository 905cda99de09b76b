#![deny(missing_docs)]
#![doc = "Codecs shared by the shell-model campaign crates: nuclide identifiers, state labels, truncations and the error taxonomy."]

pub mod errors;
/// Canonical hashing helpers.
pub mod hash;
pub mod nuclide;
/// Canonical JSON and YAML helpers.
pub mod serde;
pub mod state;
pub mod truncation;

pub use errors::{ErrorInfo, KshError};
pub use hash::stable_hash_string;
pub use nuclide::{nuclide_name, NuclideId, PERIODIC_TABLE};
pub use state::{join_state_list, parse_state_list, Parity, Spin, StateLabel};
pub use truncation::{OrbitWindow, TruncationSpec};
