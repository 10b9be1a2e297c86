use std::env;
use std::path::{Path, PathBuf};

use florify_config::{AppConfig, EditorConfig, PageConfig};
use florify_core::document::{Document, Page};
use florify_engine::editor::EditorSettings;
use florify_engine::scene::{DemoShapes, Scene};
use florify_io::{DocumentLoader, JsonFacade};
use tracing::{info, warn};

use crate::errors::FrontendError;

/// 指定蓝图 JSON 路径的环境变量。
pub const BLUEPRINT_ENV: &str = "FLORIFY_BLUEPRINT_JSON";

/// 文档来源，便于前端呈现加载信息。
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentSource {
    Json(PathBuf),
    Demo,
}

/// 统一封装加载后的场景与元信息。
#[derive(Debug)]
pub struct LoadedScene {
    pub scene: Scene,
    pub source: DocumentSource,
    pub demo_shapes: Option<DemoShapes>,
}

/// 按优先级加载场景：显式路径、环境变量 `FLORIFY_BLUEPRINT_JSON`、配置中的
/// `storage.blueprint_path`，都不可用时构建内置示例。
///
/// 显式路径读取失败直接返回错误；其余来源失败只记录警告并继续回退。
pub fn load_scene(config: &AppConfig, input: Option<&Path>) -> Result<LoadedScene, FrontendError> {
    let mut scene = Scene::with_display_scale(config.editor.display_scale);
    let loader = JsonFacade::new();

    if let Some(path) = input {
        let document = loader.load(path).map_err(|source| FrontendError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), shapes = document.shape_count(), "从 JSON 加载蓝图成功");
        scene.load_document(document);
        return Ok(LoadedScene {
            scene,
            source: DocumentSource::Json(path.to_path_buf()),
            demo_shapes: None,
        });
    }

    let fallbacks = env::var_os(BLUEPRINT_ENV)
        .map(PathBuf::from)
        .into_iter()
        .chain(config.storage.blueprint_path.clone());
    for path in fallbacks {
        match loader.load(&path) {
            Ok(document) => {
                info!(path = %path.display(), shapes = document.shape_count(), "从 JSON 加载蓝图成功");
                scene.load_document(document);
                return Ok(LoadedScene {
                    scene,
                    source: DocumentSource::Json(path),
                    demo_shapes: None,
                });
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "加载蓝图失败，尝试下一个来源");
            }
        }
    }

    Ok(demo_scene(scene, &config.page))
}

fn demo_scene(mut scene: Scene, page: &PageConfig) -> LoadedScene {
    let page = page_from_config(page);
    if page.has_valid_dimensions() {
        scene.load_document(Document::with_page(page));
    } else {
        warn!(width = page.width, height = page.height, "配置的页面尺寸无效，使用 A4");
    }
    let demo_shapes = scene.populate_demo();
    let _ = scene.select(&demo_shapes.garden_bed);
    scene.focus_on_selection();

    LoadedScene {
        scene,
        source: DocumentSource::Demo,
        demo_shapes: Some(demo_shapes),
    }
}

pub fn page_from_config(config: &PageConfig) -> Page {
    Page::new(config.width, config.height, config.unit.clone())
}

pub fn editor_settings(config: &EditorConfig) -> EditorSettings {
    EditorSettings {
        grid_size: config.grid_size,
        snap_to_grid: config.snap_to_grid,
        hit_tolerance: config.hit_tolerance,
    }
}
