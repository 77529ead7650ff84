// /////////////////////////////////////////////////////////////////////////////
// Worktrack Control Plane
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Handler Modules
//!
//! Per-entity orchestration over the entity services. Every handler follows
//! the same template: extract and validate fields, call the repository,
//! publish one event on mutation success, serialize the outcome. The
//! dispatcher has already authenticated the actor and consulted the
//! permission port by the time a handler runs.

pub mod attachment;
pub mod comment;
pub mod cycle;
pub mod document;
pub mod labeled;
pub mod metadata;
pub mod project;
pub mod relation;
pub mod ticket;
pub mod user;

use worktrack_domain::entities::MappingKind;

use super::dispatcher::Route;
use relation::{attach_route, detach_route, list_route, ListSide};

/// The complete closed route table.
pub fn all_routes() -> Vec<Route> {
    let mut routes = Vec::new();
    routes.extend(labeled::routes());
    routes.extend(cycle::routes());
    routes.extend(ticket::routes());
    routes.extend(project::routes());
    routes.extend(document::routes());
    routes.extend(comment::routes());
    routes.extend(attachment::routes());
    routes.extend(user::routes());
    routes.extend(metadata::routes());

    // Label categories: the label is the left endpoint.
    routes.push(attach_route("label.assignCategory", "label", MappingKind::LabelCategory));
    routes.push(detach_route("label.unassignCategory", "label", MappingKind::LabelCategory));
    routes.push(list_route(
        "label.listCategories",
        "label",
        MappingKind::LabelCategory,
        ListSide::RightByLeft,
    ));

    routes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_action_tags_are_unique() {
        let routes = all_routes();
        let mut seen = HashSet::new();
        for route in &routes {
            assert!(seen.insert(route.action.clone()), "duplicate tag {}", route.action);
        }
    }

    #[test]
    fn test_labeled_family_is_fully_routed() {
        let tags: HashSet<String> = all_routes().into_iter().map(|r| r.action).collect();
        for object in ["label", "priority", "ticketType", "documentSpace"] {
            for op in ["create", "read", "list", "modify", "remove"] {
                assert!(tags.contains(&format!("{object}.{op}")), "missing {object}.{op}");
            }
        }
    }

    #[test]
    fn test_only_listings_are_public() {
        for route in all_routes() {
            if route.public {
                assert!(!route.mutates, "public route {} must not mutate", route.action);
                assert!(route.action.ends_with(".list"), "unexpected public route {}", route.action);
            }
        }
    }
}
