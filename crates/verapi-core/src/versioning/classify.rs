//! Route classification by version label

use super::config::VersioningConfig;
use super::label::{VersionLabel, VersionMark};
use crate::router::{Route, RouteId, Router};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Routes of the table partitioned by version
#[derive(Debug, Default)]
pub struct Classification {
    /// Routes of each version, in route table order
    pub groups: IndexMap<VersionLabel, Vec<Route>>,
    /// Routes to take out of the unversioned table
    pub removable: HashSet<RouteId>,
}

impl Classification {
    /// Labels of every group, sorted as strings
    pub fn versions(&self) -> Vec<VersionLabel> {
        let mut versions: Vec<VersionLabel> = self.groups.keys().cloned().collect();
        versions.sort();
        versions
    }
}

/// Partition the routes of `router` by version
///
/// A route joins the group of each of its labels and is marked removable.
/// Routes without a tag, or with an empty one, join the default version if
/// there is one. A route tagged with the unversioned marker alone is left
/// alone. Routes at `docs_url`, whatever their method, are marked removable
/// without joining any group, since the versioned docs page replaces them.
pub fn classify(
    router: &Router,
    config: &VersioningConfig,
    docs_url: Option<&str>,
) -> Classification {
    let mut classification = Classification::default();

    for route in router.routes() {
        if route.is_internal() {
            continue;
        }

        if docs_url.is_some_and(|url| route.full_path() == url) {
            classification.removable.insert(route.id());
            continue;
        }

        let labels: Vec<&VersionLabel> = match router.version_of(route.id()) {
            Some(tag) if !tag.is_empty() => tag
                .marks()
                .iter()
                .filter_map(|mark| match mark {
                    VersionMark::Version(label) => Some(label),
                    VersionMark::Unversioned => None,
                })
                .collect(),
            _ => config.default_version.iter().collect(),
        };

        for label in &labels {
            classification
                .groups
                .entry((*label).clone())
                .or_default()
                .push(route.clone());
        }
        if !labels.is_empty() {
            classification.removable.insert(route.id());
        }
    }

    classification
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::get;
    use crate::versioning::{unversioned, version, VersionTag};

    async fn list_cookies() -> &'static str {
        "cookies"
    }

    async fn get_cookie() -> &'static str {
        "cookie"
    }

    async fn health() -> &'static str {
        "ok"
    }

    fn paths(routes: &[Route]) -> Vec<String> {
        routes.iter().map(Route::full_path).collect()
    }

    #[test]
    fn labels_fan_out_to_each_group() {
        let router = Router::new()
            .route("/cookies", get(version([1, 2], list_cookies)))
            .route("/cookies/{id}", get(version([1], get_cookie)));

        let classification = classify(&router, &VersioningConfig::default(), None);

        assert_eq!(
            paths(&classification.groups[&VersionLabel::new(1)]),
            vec!["/cookies", "/cookies/{id}"]
        );
        assert_eq!(paths(&classification.groups[&VersionLabel::new(2)]), vec!["/cookies"]);
        assert_eq!(classification.removable.len(), 2);

        let v1 = &classification.groups[&VersionLabel::new(1)][0];
        let v2 = &classification.groups[&VersionLabel::new(2)][0];
        assert!(v1.same_handler(v2));
    }

    #[test]
    fn untagged_routes_use_default_version() {
        let router = Router::new().route("/cake", get(list_cookies));
        let config = VersioningConfig::new().default_version(2);

        let classification = classify(&router, &config, None);
        assert_eq!(classification.versions(), vec![VersionLabel::new(2)]);
        assert_eq!(classification.removable.len(), 1);
    }

    #[test]
    fn untagged_routes_stay_without_default_version() {
        let router = Router::new().route("/cake", get(list_cookies));
        let config = VersioningConfig::new().no_default_version();

        let classification = classify(&router, &config, None);
        assert!(classification.groups.is_empty());
        assert!(classification.removable.is_empty());
    }

    #[test]
    fn empty_tag_falls_back_to_default() {
        let mut router = Router::new();
        let ids = router.add_route("/cake", get(list_cookies));
        router.set_version(ids[0], VersionTag::new());

        let classification = classify(&router, &VersioningConfig::default(), None);
        assert_eq!(classification.versions(), vec![VersionLabel::new(1)]);
    }

    #[test]
    fn unversioned_marker_leaves_route_in_place() {
        let router = Router::new()
            .route("/health", get(unversioned(health)))
            .route("/cookies", get(list_cookies));

        let classification = classify(&router, &VersioningConfig::default(), None);
        let health_id = router.routes()[0].id();

        assert!(!classification.removable.contains(&health_id));
        assert!(classification
            .groups
            .values()
            .flatten()
            .all(|route| route.id() != health_id));
    }

    #[test]
    fn mixed_tag_keeps_labels_only() {
        let mut router = Router::new();
        let ids = router.add_route("/cookies", get(list_cookies));
        router.set_version(ids[0], VersionTag::new().label("beta").unversioned());

        let classification = classify(&router, &VersioningConfig::default(), None);
        assert_eq!(classification.versions(), vec![VersionLabel::from("beta")]);
        assert!(classification.removable.contains(&ids[0]));
    }

    #[test]
    fn docs_route_is_removed_but_not_grouped() {
        let router = Router::new()
            .route("/docs", get(health))
            .route("/cookies", get(list_cookies));

        let classification = classify(&router, &VersioningConfig::default(), Some("/docs"));
        let docs_id = router.routes()[0].id();

        assert!(classification.removable.contains(&docs_id));
        assert_eq!(paths(&classification.groups[&VersionLabel::new(1)]), vec!["/cookies"]);
    }

    #[test]
    fn every_method_at_docs_url_is_removed() {
        let mut router = Router::new();
        let docs_ids = router.add_route("/docs", get(health).post(health));
        router.add_route("/cookies", get(list_cookies));

        let classification = classify(&router, &VersioningConfig::default(), Some("/docs"));

        assert_eq!(docs_ids.len(), 2);
        for id in &docs_ids {
            assert!(classification.removable.contains(id));
        }
        assert_eq!(paths(&classification.groups[&VersionLabel::new(1)]), vec!["/cookies"]);
    }

    #[test]
    fn versions_sort_as_strings() {
        let router = Router::new()
            .route("/a", get(version([2], list_cookies)))
            .route("/b", get(version([10], list_cookies)))
            .route("/c", get(version([1], list_cookies)));

        let classification = classify(&router, &VersioningConfig::default(), None);
        let versions: Vec<String> = classification
            .versions()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(versions, vec!["1", "10", "2"]);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::router::get;
    use crate::versioning::VersionTag;
    use proptest::prelude::*;

    async fn handler() -> &'static str {
        "ok"
    }

    proptest! {
        #[test]
        fn every_label_gets_the_route_exactly_once(
            tags in prop::collection::vec(prop::collection::vec(0u8..5, 0..4), 1..8)
        ) {
            let mut router = Router::new();
            let mut ids = Vec::new();
            for (i, labels) in tags.iter().enumerate() {
                let id = router.add_route(&format!("/r{}", i), get(handler))[0];
                router.set_version(id, VersionTag::labels(labels.iter().copied()));
                ids.push(id);
            }

            let classification = classify(&router, &VersioningConfig::default(), None);

            for (labels, id) in tags.iter().zip(&ids) {
                let mut expected: Vec<VersionLabel> =
                    labels.iter().map(|l| VersionLabel::new(*l)).collect();
                if expected.is_empty() {
                    expected.push(VersionLabel::new(1));
                }
                for (label, routes) in &classification.groups {
                    let count = routes.iter().filter(|r| r.id() == *id).count();
                    prop_assert_eq!(count, usize::from(expected.contains(label)));
                }
                prop_assert!(classification.removable.contains(id));
            }
        }
    }
}
