use std::sync::Arc;

use action_locator::PollingResolver;
use action_primitives::{ActionReport, ExecCtx};
use async_trait::async_trait;
use page_adapter::DomPort;

use crate::errors::ClickError;
use crate::model::ClickParams;
use crate::policy::ClickPolicyView;
use crate::runner::{execute, RuntimeDeps};

#[async_trait]
pub trait ClickTool: Send + Sync {
    async fn run(&self, ctx: ExecCtx, params: ClickParams) -> Result<ActionReport, ClickError>;

    /// Runs with a fresh context carrying the policy's budget.
    async fn click(&self, params: ClickParams) -> Result<ActionReport, ClickError> {
        self.run(ExecCtx::new(self.policy().timeouts.budget()), params)
            .await
    }

    fn policy(&self) -> &ClickPolicyView;
}

pub struct ClickToolBuilder {
    policy: ClickPolicyView,
    port: Arc<dyn DomPort>,
    resolver: Option<Arc<PollingResolver>>,
}

impl ClickToolBuilder {
    pub fn new(port: Arc<dyn DomPort>) -> Self {
        Self {
            policy: ClickPolicyView::default(),
            port,
            resolver: None,
        }
    }

    pub fn with_policy(mut self, policy: ClickPolicyView) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<PollingResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn build(self) -> Arc<dyn ClickTool> {
        let resolver = self
            .resolver
            .unwrap_or_else(|| Arc::new(PollingResolver::new(self.port.clone())));
        Arc::new(ClickToolImpl {
            policy: self.policy,
            port: self.port,
            resolver,
        })
    }
}

pub struct ClickToolImpl {
    policy: ClickPolicyView,
    port: Arc<dyn DomPort>,
    resolver: Arc<PollingResolver>,
}

#[async_trait]
impl ClickTool for ClickToolImpl {
    async fn run(&self, ctx: ExecCtx, params: ClickParams) -> Result<ActionReport, ClickError> {
        if ctx.is_cancelled() {
            return Err(ClickError::Cancelled);
        }
        let runtime = RuntimeDeps {
            port: self.port.as_ref(),
            resolver: self.resolver.as_ref(),
            policy: &self.policy,
        };
        execute(&ctx, params, runtime).await
    }

    fn policy(&self) -> &ClickPolicyView {
        &self.policy
    }
}
