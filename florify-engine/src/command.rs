use std::collections::HashMap;

use tracing::debug;

use crate::scene::Scene;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    pub name: String,
    pub args: Vec<String>,
}

impl CommandRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// 以空白切分一行命令文本，首个词为命令名。空行返回 `None`。
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let name = parts.next()?;
        Some(Self {
            name: name.to_string(),
            args: parts.map(str::to_string).collect(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct CommandResponse {
    pub success: bool,
    pub message: Option<String>,
}

impl CommandResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

pub trait CommandHandler: Send + Sync {
    fn name(&self) -> &'static str;
    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse;
}

pub struct CommandContext<'a> {
    pub scene: &'a mut Scene,
}

pub struct CommandBus {
    handlers: HashMap<&'static str, Box<dyn CommandHandler>>,
}

impl CommandBus {
    pub fn new() -> Self {
        let mut bus = Self {
            handlers: HashMap::new(),
        };
        bus.register(FocusSelectionCommand);
        bus.register(ClearSelectionCommand);
        bus.register(DeleteSelectionCommand);
        bus.register(ApplyTemplateCommand);
        bus.register(ClearRoleCommand);
        bus.register(ValidateCommand);
        bus
    }

    pub fn register<H: CommandHandler + 'static>(&mut self, handler: H) {
        self.handlers.insert(handler.name(), Box::new(handler));
    }

    pub fn dispatch(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        debug!(command = %request.name, args = ?request.args, "分发命令");
        if let Some(handler) = self.handlers.get(request.name.as_str()) {
            handler.execute(request, context)
        } else {
            CommandResponse::err(format!("未知命令: {}", request.name))
        }
    }

    /// 按名称排序返回已注册命令。
    pub fn available_commands(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::new()
    }
}

fn first_arg<'r>(request: &'r CommandRequest, usage: &str) -> Result<&'r str, CommandResponse> {
    request
        .args
        .first()
        .map(String::as_str)
        .ok_or_else(|| CommandResponse::err(format!("缺少参数，用法: {usage}")))
}

struct FocusSelectionCommand;

impl CommandHandler for FocusSelectionCommand {
    fn name(&self) -> &'static str {
        "focus_selection"
    }

    fn execute(
        &self,
        _request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        context.scene.focus_on_selection();
        CommandResponse::ok("视口已聚焦当前选中图形")
    }
}

struct ClearSelectionCommand;

impl CommandHandler for ClearSelectionCommand {
    fn name(&self) -> &'static str {
        "clear_selection"
    }

    fn execute(
        &self,
        _request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        context.scene.clear_selection();
        CommandResponse::ok("选中已清空")
    }
}

struct DeleteSelectionCommand;

impl CommandHandler for DeleteSelectionCommand {
    fn name(&self) -> &'static str {
        "delete_selection"
    }

    fn execute(
        &self,
        _request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        match context.scene.delete_selection() {
            Some(shape) => CommandResponse::ok(format!("已删除图形 {}", shape.id())),
            None => CommandResponse::ok("没有选中的图形"),
        }
    }
}

struct ApplyTemplateCommand;

impl CommandHandler for ApplyTemplateCommand {
    fn name(&self) -> &'static str {
        "apply_template"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let template_id = match first_arg(request, "apply_template <模板ID>") {
            Ok(id) => id,
            Err(response) => return response,
        };
        match context.scene.apply_template(template_id) {
            Ok(id) => CommandResponse::ok(format!("已应用模板 {template_id}，生成图形 {id}")),
            Err(err) => CommandResponse::err(err.to_string()),
        }
    }
}

struct ClearRoleCommand;

impl CommandHandler for ClearRoleCommand {
    fn name(&self) -> &'static str {
        "clear_role"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let role = match first_arg(request, "clear_role <角色>") {
            Ok(role) => role,
            Err(response) => return response,
        };
        let removed = context.scene.clear_role(role);
        CommandResponse::ok(format!("已移除 {removed} 个 {role} 图形"))
    }
}

struct ValidateCommand;

impl CommandHandler for ValidateCommand {
    fn name(&self) -> &'static str {
        "validate"
    }

    fn execute(
        &self,
        _request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let report = context.scene.document().validate();
        if report.is_valid {
            CommandResponse::ok("文档校验通过")
        } else {
            CommandResponse::err(report.errors.join("; "))
        }
    }
}
