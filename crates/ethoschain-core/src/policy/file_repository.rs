use std::{collections::HashSet, fs, path::PathBuf};

use anyhow::{Context, Result};

use super::{PolicyRule, PolicyRuleRepository, RuleTier};
use once_cell::sync::OnceCell;

/// Loads the keyword table from `keywords.txt` under a base directory.
///
/// Each non-comment line reads `ID|tier|keyword`; line order is table order.
pub struct FileRuleRepository {
    base_path: PathBuf,
    cache: OnceCell<Vec<PolicyRule>>,
}

impl FileRuleRepository {
    /// Create a repository rooted at the given directory.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            cache: OnceCell::new(),
        }
    }

    fn keywords_path(&self) -> PathBuf {
        self.base_path.join("keywords.txt")
    }

    fn load_keywords(&self) -> Result<Vec<PolicyRule>> {
        let path = self.keywords_path();
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read keyword rule file at {}", path.display()))?;
        let mut seen = HashSet::new();
        let mut rules = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let parts: Vec<_> = trimmed.splitn(3, '|').map(str::trim).collect();
            if parts.len() != 3 {
                return Err(anyhow::anyhow!(
                    "invalid keyword rule format at {}:{} (expected id|tier|keyword)",
                    path.display(),
                    idx + 1
                ));
            }
            let id = parts[0].to_string();
            if !seen.insert(id.clone()) {
                return Err(anyhow::anyhow!("duplicate rule id `{id}`"));
            }
            let tier: RuleTier = parts[1].parse().with_context(|| {
                format!(
                    "invalid tier for rule `{}` at {}:{}",
                    id,
                    path.display(),
                    idx + 1
                )
            })?;
            rules.push(PolicyRule::new(id, tier, parts[2])?);
        }
        Ok(rules)
    }
}

#[async_trait::async_trait]
impl PolicyRuleRepository for FileRuleRepository {
    async fn load_rules(&self) -> Result<Vec<PolicyRule>> {
        let rules = self.cache.get_or_try_init(|| self.load_keywords())?;
        Ok(rules.clone())
    }
}
