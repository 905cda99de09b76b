#![deny(missing_docs)]
#![doc = "Run descriptors, derived artefact names and parsers for the solver's energy summaries and logs."]

pub mod config;
pub mod descriptor;
pub mod interaction;
pub mod occupation;
pub mod summary;

pub use config::{load_config, CampaignConfig, RunArgs, RunSpec};
pub use descriptor::RunDescriptor;
pub use interaction::{Interaction, InteractionService, ZeroBodyOffset};
pub use occupation::{parse_log, read_logs, StateOccupation};
pub use summary::{
    nudge_past, parse_summary, parse_wavefunction_index, read_summary, read_wavefunction_index,
    summary_rows, EnergyTable, SummaryRow, WavefunctionIndex, WavefunctionRef, ENERGY_NUDGE,
};
