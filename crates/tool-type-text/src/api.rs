use std::sync::Arc;

use action_locator::PollingResolver;
use action_primitives::{ActionReport, ExecCtx};
use async_trait::async_trait;
use page_adapter::DomPort;

use crate::errors::TypeTextError;
use crate::model::TextParams;
use crate::policy::TypePolicyView;
use crate::runner::{execute, RuntimeDeps};
use crate::tempo::{NaturalTempo, TempoPort};

#[async_trait]
pub trait TypeTextTool: Send + Sync {
    async fn run(&self, ctx: ExecCtx, params: TextParams) -> Result<ActionReport, TypeTextError>;

    /// Runs with a fresh context carrying the policy's budget.
    async fn type_text(&self, params: TextParams) -> Result<ActionReport, TypeTextError> {
        self.run(ExecCtx::new(self.policy().timeouts.budget()), params)
            .await
    }

    fn policy(&self) -> &TypePolicyView;
}

pub struct TypeTextToolBuilder {
    policy: TypePolicyView,
    port: Arc<dyn DomPort>,
    resolver: Option<Arc<PollingResolver>>,
    tempo: Option<Arc<dyn TempoPort>>,
}

impl TypeTextToolBuilder {
    pub fn new(port: Arc<dyn DomPort>) -> Self {
        Self {
            policy: TypePolicyView::default(),
            port,
            resolver: None,
            tempo: None,
        }
    }

    pub fn with_policy(mut self, policy: TypePolicyView) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<PollingResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn with_tempo(mut self, tempo: Arc<dyn TempoPort>) -> Self {
        self.tempo = Some(tempo);
        self
    }

    pub fn build(self) -> Arc<dyn TypeTextTool> {
        let resolver = self
            .resolver
            .unwrap_or_else(|| Arc::new(PollingResolver::new(self.port.clone())));
        let tempo = self
            .tempo
            .unwrap_or_else(|| Arc::new(NaturalTempo::new(self.policy.delays)));
        Arc::new(TypeTextToolImpl {
            policy: self.policy,
            port: self.port,
            resolver,
            tempo,
        })
    }
}

pub struct TypeTextToolImpl {
    policy: TypePolicyView,
    port: Arc<dyn DomPort>,
    resolver: Arc<PollingResolver>,
    tempo: Arc<dyn TempoPort>,
}

#[async_trait]
impl TypeTextTool for TypeTextToolImpl {
    async fn run(&self, ctx: ExecCtx, params: TextParams) -> Result<ActionReport, TypeTextError> {
        if ctx.is_cancelled() {
            return Err(TypeTextError::Cancelled);
        }
        let runtime = RuntimeDeps {
            port: self.port.as_ref(),
            resolver: self.resolver.as_ref(),
            tempo: self.tempo.as_ref(),
            policy: &self.policy,
        };
        execute(&ctx, params, runtime).await
    }

    fn policy(&self) -> &TypePolicyView {
        &self.policy
    }
}
