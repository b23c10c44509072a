//! Element resolution strategies
//!
//! One implementation per [`SelectorStrategy`] variant. A strategy asked to
//! evaluate a variant it does not own returns no candidates.

use action_primitives::SelectorStrategy;
use async_trait::async_trait;
use page_adapter::{DomPort, ElementHandle, ElementSnapshot};
use tracing::debug;

use crate::errors::LocatorError;

#[async_trait]
pub trait Strategy: Send + Sync {
    /// Candidates in document order, optionally restricted to `scope`.
    async fn candidates(
        &self,
        port: &dyn DomPort,
        selector: &SelectorStrategy,
        scope: Option<&ElementHandle>,
    ) -> Result<Vec<ElementSnapshot>, LocatorError>;

    fn name(&self) -> &'static str;
}

async fn query(
    port: &dyn DomPort,
    selector: &str,
    scope: Option<&ElementHandle>,
) -> Result<Vec<ElementSnapshot>, LocatorError> {
    if selector.trim().is_empty() {
        return Err(LocatorError::InvalidAnchor("empty CSS selector".into()));
    }
    let found = match scope {
        Some(root) => port.query_within(root, selector).await?,
        None => port.query_all(selector).await?,
    };
    Ok(found)
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

pub struct CssStrategy;

#[async_trait]
impl Strategy for CssStrategy {
    async fn candidates(
        &self,
        port: &dyn DomPort,
        selector: &SelectorStrategy,
        scope: Option<&ElementHandle>,
    ) -> Result<Vec<ElementSnapshot>, LocatorError> {
        match selector {
            SelectorStrategy::Css(css) => {
                debug!("Resolving CSS selector: {}", css);
                query(port, css, scope).await
            }
            _ => Ok(Vec::new()),
        }
    }

    fn name(&self) -> &'static str {
        "css"
    }
}

/// Case-insensitive visible-text match within a CSS scope.
pub struct TextStrategy;

#[async_trait]
impl Strategy for TextStrategy {
    async fn candidates(
        &self,
        port: &dyn DomPort,
        selector: &SelectorStrategy,
        scope: Option<&ElementHandle>,
    ) -> Result<Vec<ElementSnapshot>, LocatorError> {
        match selector {
            SelectorStrategy::Text {
                scope: css,
                contains,
            } => {
                debug!("Resolving text '{}' within {}", contains, css);
                let found = query(port, css, scope).await?;
                Ok(found
                    .into_iter()
                    .filter(|el| contains_ci(&el.text, contains))
                    .collect())
            }
            _ => Ok(Vec::new()),
        }
    }

    fn name(&self) -> &'static str {
        "text"
    }
}

pub struct AttributeStrategy;

#[async_trait]
impl Strategy for AttributeStrategy {
    async fn candidates(
        &self,
        port: &dyn DomPort,
        selector: &SelectorStrategy,
        scope: Option<&ElementHandle>,
    ) -> Result<Vec<ElementSnapshot>, LocatorError> {
        match selector {
            SelectorStrategy::Attribute {
                scope: css,
                name,
                contains,
            } => {
                debug!("Resolving {}[{}~'{}']", css, name, contains);
                let found = query(port, css, scope).await?;
                Ok(found
                    .into_iter()
                    .filter(|el| {
                        el.attribute(name)
                            .map(|v| contains_ci(v, contains))
                            .unwrap_or(false)
                    })
                    .collect())
            }
            _ => Ok(Vec::new()),
        }
    }

    fn name(&self) -> &'static str {
        "attribute"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_adapter::{MemoryPage, NodeSpec};

    #[tokio::test]
    async fn text_strategy_is_case_insensitive() {
        let page = MemoryPage::new("https://example.test/");
        page.insert(NodeSpec::button("Continue to listing").matches("button"));
        page.insert(NodeSpec::button("Cancel").matches("button"));

        let found = TextStrategy
            .candidates(page.as_ref(), &SelectorStrategy::text("button", "CONTINUE"), None)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "Continue to listing");
    }

    #[tokio::test]
    async fn attribute_strategy_filters_by_value() {
        let page = MemoryPage::new("https://example.test/");
        page.insert(NodeSpec::button("x").matches("button").attr("aria-label", "Close dialog"));
        page.insert(NodeSpec::button("y").matches("button").attr("aria-label", "Open"));

        let selector = SelectorStrategy::attribute("button", "aria-label", "close");
        let found = AttributeStrategy
            .candidates(page.as_ref(), &selector, None)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text, "x");
    }

    #[tokio::test]
    async fn strategies_ignore_foreign_variants() {
        let page = MemoryPage::new("https://example.test/");
        page.insert(NodeSpec::button("x").matches("button"));
        let found = CssStrategy
            .candidates(page.as_ref(), &SelectorStrategy::text("button", "x"), None)
            .await
            .unwrap();
        assert!(found.is_empty());
    }
}
