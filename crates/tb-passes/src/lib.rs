//! Passes & worklist (§4.F): the generic graph-rewriting driver, the
//! `scheduled[gvn]→bb` map builder, and the readiness predicate the list
//! scheduler (component G) is built on top of.

mod gcm;
mod peephole;
mod readiness;
mod worklist;

pub use gcm::assign_scheduled_blocks;
pub use peephole::run_constant_fold;
pub use readiness::is_node_ready;
pub use worklist::Worklist;
