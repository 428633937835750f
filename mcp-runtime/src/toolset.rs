//! Toolset selection: which tools are exposed for this process.
//!
//! Computed once at startup from a comma-separated configuration string and
//! never changed afterwards.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::tool::Tool;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Toolset {
    Default,
    Schema,
    Content,
    Flow,
    Dashboard,
    /// Catch-all: exposes every tool.
    All,
}

impl Toolset {
    pub const VARIANTS: [Toolset; 6] = [
        Toolset::Default,
        Toolset::Schema,
        Toolset::Content,
        Toolset::Flow,
        Toolset::Dashboard,
        Toolset::All,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Toolset::Default => "default",
            Toolset::Schema => "schema",
            Toolset::Content => "content",
            Toolset::Flow => "flow",
            Toolset::Dashboard => "dashboard",
            Toolset::All => "all",
        }
    }
}

impl fmt::Display for Toolset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Toolset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Toolset::VARIANTS
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                Error::config(format!(
                    "unknown toolset '{s}', expected one of: {}",
                    Toolset::VARIANTS.map(Toolset::as_str).join(", ")
                ))
            })
    }
}

// =============================================================================
// Active set
// =============================================================================

/// The toolsets enabled for this process. Never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveToolsets {
    toolsets: BTreeSet<Toolset>,
}

impl Default for ActiveToolsets {
    fn default() -> Self {
        Self::only(Toolset::Default)
    }
}

impl ActiveToolsets {
    pub fn only(toolset: Toolset) -> Self {
        Self {
            toolsets: BTreeSet::from([toolset]),
        }
    }

    /// Parse the configuration string. Unknown tokens are dropped with a
    /// warning; `all` collapses the set to itself; nothing valid falls back to
    /// `default`.
    pub fn parse(raw: Option<&str>) -> Self {
        let mut toolsets = BTreeSet::new();
        let mut saw_tokens = false;

        for token in raw
            .unwrap_or_default()
            .split(',')
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty())
        {
            saw_tokens = true;
            match token.parse::<Toolset>() {
                Ok(toolset) => {
                    toolsets.insert(toolset);
                }
                Err(err) => tracing::warn!(toolset = %token, "ignoring toolset: {err}"),
            }
        }

        if toolsets.contains(&Toolset::All) {
            return Self::only(Toolset::All);
        }
        if toolsets.is_empty() {
            if saw_tokens {
                tracing::warn!("no valid toolsets configured, falling back to 'default'");
            }
            return Self::default();
        }
        Self { toolsets }
    }

    pub fn contains(&self, toolset: Toolset) -> bool {
        self.toolsets.contains(&toolset)
    }

    /// Whether a tool declaring `membership` is exposed.
    pub fn exposes(&self, membership: &[Toolset]) -> bool {
        self.contains(Toolset::All) || membership.iter().any(|t| self.toolsets.contains(t))
    }

    pub fn to_vec(&self) -> Vec<Toolset> {
        self.toolsets.iter().copied().collect()
    }
}

impl fmt::Display for ActiveToolsets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.toolsets.iter().map(|t| t.as_str()).collect();
        f.write_str(&names.join(","))
    }
}

// =============================================================================
// Registry
// =============================================================================

/// All known tools plus the active selection.
#[derive(Debug)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
    index: HashMap<&'static str, usize>,
    active: ActiveToolsets,
}

impl ToolRegistry {
    pub fn new(active: ActiveToolsets) -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
            active,
        }
    }

    pub fn with_tools(active: ActiveToolsets, tools: impl IntoIterator<Item = Tool>) -> Result<Self> {
        let mut registry = Self::new(active);
        for tool in tools {
            registry.register(tool)?;
        }
        Ok(registry)
    }

    /// Names must be unique and every tool needs at least one toolset.
    pub fn register(&mut self, tool: Tool) -> Result<()> {
        if tool.toolsets().is_empty() {
            return Err(Error::Registry(format!(
                "tool '{}' declares no toolset",
                tool.name()
            )));
        }
        if self.index.contains_key(tool.name()) {
            return Err(Error::Registry(format!(
                "duplicate tool name '{}'",
                tool.name()
            )));
        }
        self.index.insert(tool.name(), self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    pub fn active(&self) -> &ActiveToolsets {
        &self.active
    }

    /// Every registered tool, exposed or not, in registration order.
    pub fn all(&self) -> &[Tool] {
        &self.tools
    }

    /// Tools visible under the active toolsets, in registration order.
    pub fn exposed(&self) -> impl Iterator<Item = &Tool> {
        self.tools
            .iter()
            .filter(|tool| self.active.exposes(tool.toolsets()))
    }

    /// Look up a callable tool, telling apart unknown names from tools hidden
    /// by the toolset selection.
    pub fn resolve(&self, name: &str) -> Result<&Tool> {
        let tool = self
            .index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| Error::ToolNotFound(name.to_string()))?;
        if !self.active.exposes(tool.toolsets()) {
            return Err(Error::ToolNotEnabled {
                tool: name.to_string(),
                required: tool.toolsets().to_vec(),
                active: self.active.to_vec(),
            });
        }
        Ok(tool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::InputSchema;
    use crate::tool::{ToolDef, data_tool};
    use serde_json::{Value, json};

    fn tool(name: &'static str, toolsets: &'static [Toolset]) -> Tool {
        data_tool(
            ToolDef {
                name,
                description: "test tool",
                input: InputSchema::new(),
                toolsets,
            },
            |_client, _args: Value| async move { Ok(json!(null)) },
        )
    }

    fn names<'a>(tools: impl Iterator<Item = &'a Tool>) -> Vec<&'static str> {
        tools.map(|t| t.name()).collect()
    }

    #[test]
    fn parse_normalizes_and_drops_unknown_tokens() {
        let active = ActiveToolsets::parse(Some(" Schema, ,FLOW,bogus "));
        assert_eq!(active.to_vec(), vec![Toolset::Schema, Toolset::Flow]);
    }

    #[test]
    fn empty_or_invalid_configuration_defaults() {
        assert_eq!(ActiveToolsets::parse(None), ActiveToolsets::only(Toolset::Default));
        assert_eq!(ActiveToolsets::parse(Some("")), ActiveToolsets::only(Toolset::Default));
        assert_eq!(
            ActiveToolsets::parse(Some("nope, also-nope")),
            ActiveToolsets::only(Toolset::Default)
        );
    }

    #[test]
    fn catch_all_collapses_the_set() {
        let active = ActiveToolsets::parse(Some("schema,all,content"));
        assert_eq!(active.to_vec(), vec![Toolset::All]);
        assert!(active.exposes(&[Toolset::Dashboard]));
    }

    #[test]
    fn schema_selection_filters_tools() {
        let registry = ToolRegistry::with_tools(
            ActiveToolsets::parse(Some("schema")),
            [
                tool("x", &[Toolset::Default, Toolset::Schema]),
                tool("y", &[Toolset::Default]),
            ],
        )
        .unwrap();

        assert_eq!(names(registry.exposed()), vec!["x"]);
        assert_eq!(registry.all().len(), 2);
    }

    #[test]
    fn resolve_distinguishes_hidden_from_unknown() {
        let registry = ToolRegistry::with_tools(
            ActiveToolsets::default(),
            [
                tool("list_items", &[Toolset::Default, Toolset::Content]),
                tool("create_field", &[Toolset::Schema]),
            ],
        )
        .unwrap();

        assert!(registry.resolve("list_items").is_ok());
        match registry.resolve("create_field") {
            Err(Error::ToolNotEnabled {
                tool,
                required,
                active,
            }) => {
                assert_eq!(tool, "create_field");
                assert_eq!(required, vec![Toolset::Schema]);
                assert_eq!(active, vec![Toolset::Default]);
            }
            other => panic!("expected ToolNotEnabled, got {other:?}"),
        }
        assert!(matches!(
            registry.resolve("missing"),
            Err(Error::ToolNotFound(name)) if name == "missing"
        ));
    }

    #[test]
    fn registration_rejects_duplicates_and_orphans() {
        let mut registry = ToolRegistry::new(ActiveToolsets::default());
        registry.register(tool("a", &[Toolset::Default])).unwrap();
        assert!(matches!(
            registry.register(tool("a", &[Toolset::Flow])),
            Err(Error::Registry(_))
        ));
        assert!(matches!(
            registry.register(tool("b", &[])),
            Err(Error::Registry(_))
        ));
    }

    #[test]
    fn toolset_names_round_trip() {
        for toolset in Toolset::VARIANTS {
            assert_eq!(toolset.as_str().parse::<Toolset>().unwrap(), toolset);
        }
        assert!("everything".parse::<Toolset>().is_err());
    }
}
