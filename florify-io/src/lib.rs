use std::fs;
use std::path::{Path, PathBuf};

use florify_core::document::Document;
use florify_core::transport::DocumentRecord;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write file {path:?}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse blueprint {path:?}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid document structure: {0}")]
    InvalidDocument(String),
}

pub trait DocumentLoader {
    fn load(&self, path: &Path) -> Result<Document, IoError>;
}

pub trait DocumentSaver {
    fn save(&self, document: &Document, path: &Path) -> Result<(), IoError>;
}

/// 以传输格式（JSON）读写蓝图文档。
///
/// 读取时不做语义校验，结构正确即接受；`strict` 模式下额外要求 `Document::validate` 通过。
/// 保存时总是拒绝非有限数值，JSON 无法表示它们。
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFacade {
    strict: bool,
}

impl JsonFacade {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict() -> Self {
        Self { strict: true }
    }

    pub fn from_json_str(&self, content: &str) -> Result<Document, serde_json::Error> {
        let record: DocumentRecord = serde_json::from_str(content)?;
        Ok(Document::from_transport(record))
    }

    pub fn to_json_string(&self, document: &Document) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&document.to_transport())
    }

    fn check(&self, document: &Document) -> Result<(), IoError> {
        if !self.strict {
            return Ok(());
        }
        let report = document.validate();
        if report.is_valid {
            Ok(())
        } else {
            Err(IoError::InvalidDocument(report.errors.join("; ")))
        }
    }
}

/// 列出 JSON 无法表示的非有限数值所在位置。
fn non_finite_fields(document: &Document) -> Vec<String> {
    let mut fields = Vec::new();
    let page = document.page();
    if !page.width.is_finite() || !page.height.is_finite() {
        fields.push(format!("page dimensions {} x {}", page.width, page.height));
    }
    for (index, shape) in document.shapes().enumerate() {
        if shape.points.iter().any(|p| !p.is_finite()) {
            fields.push(format!("shape {index} ({}) coordinates", shape.id()));
        }
        if !shape.style.stroke_width.is_finite() {
            fields.push(format!("shape {index} ({}) stroke width", shape.id()));
        }
        for (opening_index, opening) in shape.openings.iter().enumerate() {
            if !opening.start.is_finite() || !opening.end.is_finite() {
                fields.push(format!("shape {index} ({}) opening {opening_index}", shape.id()));
            }
        }
    }
    fields
}

impl DocumentLoader for JsonFacade {
    fn load(&self, path: &Path) -> Result<Document, IoError> {
        let data = fs::read_to_string(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let document = self
            .from_json_str(&data)
            .map_err(|source| IoError::ParseError {
                path: path.to_path_buf(),
                source,
            })?;
        self.check(&document)?;
        Ok(document)
    }
}

impl DocumentSaver for JsonFacade {
    fn save(&self, document: &Document, path: &Path) -> Result<(), IoError> {
        let non_finite = non_finite_fields(document);
        if !non_finite.is_empty() {
            return Err(IoError::InvalidDocument(format!(
                "non-finite values in {}",
                non_finite.join("; ")
            )));
        }
        self.check(document)?;
        let serialized = self.to_json_string(document).map_err(|err| {
            IoError::InvalidDocument(format!("序列化文档失败: {err}"))
        })?;
        fs::write(path, serialized).map_err(|source| IoError::WriteError {
            path: path.to_path_buf(),
            source,
        })
    }
}
