//! The rendering engine: owns one template and one context

use serde_json::Value as JsonValue;
use tracing::debug;

use crate::config::EngineConfig;
use crate::context::Context;
use crate::eval::Evaluator;
use crate::template::Resolver;
use crate::RenderError;

/// Holds a template and the context it renders against
///
/// The engine owns its template, so values handed in or cloned out are never
/// affected by a later [`render`](Engine::render). `render` itself mutates the
/// held tree; call it on a fresh template for every output you need.
#[derive(Debug, Clone)]
pub struct Engine {
    template: JsonValue,
    context: Context,
    config: EngineConfig,
    evaluator: Evaluator,
}

impl Engine {
    /// Create an engine with the default configuration
    pub fn new(template: JsonValue, context: Context) -> Self {
        Self::with_config(template, context, EngineConfig::default())
    }

    pub fn with_config(template: JsonValue, context: Context, config: EngineConfig) -> Self {
        Self {
            template,
            context,
            config,
            evaluator: Evaluator::new(),
        }
    }

    /// Augment the context, then resolve the held template in place
    ///
    /// On failure the template keeps whatever was rendered before the failing
    /// slot. Use [`render_atomic`](Engine::render_atomic) to keep it intact.
    pub fn render(&mut self) -> Result<(), RenderError> {
        self.augment_context();
        let resolver = Resolver::new(&self.evaluator, self.context.entries(), &self.config);
        resolver.walk(&mut self.template)
    }

    /// Like [`render`](Engine::render), but the held template is only
    /// replaced when rendering succeeds
    ///
    /// Context augmentation and side effects of host functions still happen.
    pub fn render_atomic(&mut self) -> Result<(), RenderError> {
        self.augment_context();
        let mut draft = self.template.clone();
        let resolver = Resolver::new(&self.evaluator, self.context.entries(), &self.config);
        resolver.walk(&mut draft)?;
        self.template = draft;
        Ok(())
    }

    fn augment_context(&mut self) {
        let installed = self
            .context
            .augment(&self.config.accessor_prefix, self.config.overwrite_user_keys);
        debug!(installed, "rendering template");
    }

    pub fn template(&self) -> &JsonValue {
        &self.template
    }

    /// Replace the held template
    pub fn set_template(&mut self, template: JsonValue) {
        self.template = template;
    }

    /// Consume the engine, returning the held template
    pub fn into_template(self) -> JsonValue {
        self.template
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut Context {
        &mut self.context
    }

    /// Replace the context; the new one is augmented on the next render
    pub fn set_context(&mut self, context: Context) {
        self.context = context;
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
