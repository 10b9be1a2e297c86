use std::path::PathBuf;

use florify_io::IoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("无法加载蓝图 {path:?}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: IoError,
    },
    #[error("无法保存蓝图 {path:?}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: IoError,
    },
}
