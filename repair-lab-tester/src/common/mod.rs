pub mod scenario;
pub mod storage;
pub mod util;

pub use storage::FileStorage;
pub use util::split_csv;
