use std::collections::{HashSet, VecDeque};

use mirror_core::ExtensionFilter;
use mirror_logging::{mirror_debug, mirror_info, mirror_warn};
use url::Url;

use crate::fetch::RemoteClient;

/// State of one walk invocation: the frontier of directory URLs awaiting
/// listing and the set of directories already dequeued. Discarded when the
/// walk returns.
#[derive(Debug)]
pub struct CrawlSession {
    frontier: VecDeque<Url>,
    visited: HashSet<Url>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkOutcome {
    /// Candidate file URLs in discovery order. A file linked from two
    /// pages appears twice; downstream same-size skips and batch dedup
    /// absorb the duplicate.
    pub candidates: Vec<Url>,
    pub directories_listed: usize,
}

impl CrawlSession {
    pub fn new(root: Url) -> Self {
        let mut frontier = VecDeque::new();
        frontier.push_back(root);
        Self {
            frontier,
            visited: HashSet::new(),
        }
    }

    /// Breadth-first traversal over the remote listing graph.
    ///
    /// A href ending in a path separator is a sub-directory and joins the
    /// frontier; anything else whose extension is in the allow-set becomes
    /// a candidate. The visited set is the only loop protection; a finite
    /// listing graph is assumed, with no depth or URL-count bound. Listing
    /// failures degrade to an empty link set so the walk continues, silently
    /// under-discovering that subtree.
    pub async fn walk(mut self, client: &RemoteClient, filter: &ExtensionFilter) -> WalkOutcome {
        let mut candidates = Vec::new();
        let mut directories_listed = 0;

        while let Some(url) = self.frontier.pop_front() {
            if !self.visited.insert(url.clone()) {
                continue;
            }
            mirror_info!("listing {url}");
            directories_listed += 1;

            let hrefs = match client.fetch_listing(&url).await {
                Ok(hrefs) => hrefs,
                Err(err) => {
                    mirror_warn!("failed to list {url}: {err}");
                    Vec::new()
                }
            };

            for href in hrefs {
                let resolved = match url.join(&href) {
                    Ok(resolved) => resolved,
                    Err(err) => {
                        mirror_debug!("skipping unresolvable href {href:?} on {url}: {err}");
                        continue;
                    }
                };
                if href.ends_with('/') {
                    self.frontier.push_back(resolved);
                } else if filter.matches_path(resolved.path()) {
                    candidates.push(resolved);
                }
            }
        }

        WalkOutcome {
            candidates,
            directories_listed,
        }
    }
}
