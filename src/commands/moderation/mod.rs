mod antispam;
mod purge;

pub use antispam::antispam;
pub use purge::purge;
