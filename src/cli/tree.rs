//! Group hierarchy rendering with termtree

use generational_arena::Index;
use itertools::Itertools;
use termtree::Tree;

use crate::application::services::Catalog;
use crate::application::ApplicationError;

/// Build display trees, one per root (or one for `start`).
pub fn forest(catalog: &Catalog, start: Option<&str>) -> Result<Vec<Tree<String>>, ApplicationError> {
    match start {
        Some(id) => {
            let idx = catalog
                .groups
                .index_of(id)
                .ok_or_else(|| ApplicationError::GroupNotFound(id.to_string()))?;
            Ok(vec![group_tree(catalog, idx)])
        }
        None => Ok(catalog
            .groups
            .root_indices()
            .iter()
            .map(|&idx| group_tree(catalog, idx))
            .collect()),
    }
}

fn group_tree(catalog: &Catalog, idx: Index) -> Tree<String> {
    let Some(node) = catalog.groups.node_at(idx) else {
        return Tree::new(String::new());
    };
    let label = match node.group.url() {
        Some(url) => format!("{} <{}>", node.group, url),
        None => node.group.to_string(),
    };

    let subgroups = node.children.iter().map(|&child| group_tree(catalog, child));
    let repositories = catalog
        .repositories
        .iter()
        .filter(|r| r.group_id() == node.group.id())
        .sorted_by_key(|r| r.name().to_lowercase())
        .map(|r| Tree::new(format!("{} ({})", r.name(), r.url())));

    Tree::new(label).with_leaves(subgroups.chain(repositories))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::application::services::CatalogService;
    use crate::application::{CatalogSnapshot, MissingParentPolicy};
    use crate::domain::SystemClock;
    use crate::infrastructure::traits::MemoryFileSystem;

    fn catalog() -> Catalog {
        let snapshot = CatalogSnapshot::from_toml(
            r#"
[[groups]]
id = "p"
name = "Platform"

[[groups]]
id = "b"
name = "Backend"
parent = "p"

[[repositories]]
id = "z"
name = "zeta"
group = "p"
url = "https://x/z"

[[repositories]]
id = "a"
name = "Alpha"
group = "p"
url = "https://x/a"
"#,
        )
        .unwrap();
        CatalogService::new(
            Arc::new(MemoryFileSystem::new()),
            Arc::new(SystemClock),
            MissingParentPolicy::Error,
        )
        .build(snapshot)
        .unwrap()
    }

    #[test]
    fn subgroups_come_before_repositories_sorted_by_name() {
        let trees = forest(&catalog(), None).unwrap();
        assert_eq!(trees.len(), 1);

        let rendered = trees[0].to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Platform [p]");
        assert!(lines[1].ends_with("Backend [b]"));
        assert!(lines[2].ends_with("Alpha (https://x/a)"));
        assert!(lines[3].ends_with("zeta (https://x/z)"));
    }

    #[test]
    fn unknown_start_group_is_reported() {
        let result = forest(&catalog(), Some("nope"));
        assert!(matches!(result, Err(ApplicationError::GroupNotFound(_))));
    }
}
