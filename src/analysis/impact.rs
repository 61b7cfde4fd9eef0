//! Impact scoring and project-wide file relationship mapping.
//!
//! Impact level is a small additive score from three independent signals:
//! modification frequency, dependent count, and filename patterns. The
//! relationship map is a directed graph over every discovered code file's
//! resolved dependencies, rebuilt wholesale on each call - cycles,
//! orphans, critical files, and clusters are all derived facts with no
//! incremental maintenance.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::path::Path;
use tracing::{debug, info};

use crate::analysis::{dependency, discovery};
use crate::error::Result;
use crate::types::{
    CriticalFile, FileCategory, FileCluster, GraphStatistics, ImpactLevel, ImpactReport,
    RelationshipMap,
};

/// Reverse-dependent count at which a file is considered critical.
const CRITICAL_DEPENDENT_THRESHOLD: usize = 5;

/// Additive impact score from the three signals.
///
/// Modification and dependent counts bucket identically (>10 adds 3,
/// >5 adds 2, >0 adds 1); config-like files add 2 and test-like files
/// subtract 1. Clamped at zero.
pub fn score_impact(file: &str, recent_modifications: u32, dependent_count: usize) -> i32 {
    let mut score = bucket(recent_modifications as usize) + bucket(dependent_count);

    match discovery::categorize(file) {
        FileCategory::ConfigFiles => score += 2,
        FileCategory::Tests => score -= 1,
        _ => {}
    }

    score.max(0)
}

fn bucket(count: usize) -> i32 {
    match count {
        c if c > 10 => 3,
        c if c > 5 => 2,
        c if c > 0 => 1,
        _ => 0,
    }
}

/// Assemble an impact report from pre-gathered signals.
///
/// Modification counts come from the file-metadata collaborator and
/// affected themes from the theme store; a failing collaborator simply
/// contributes zero/empty here.
pub fn assess_impact(
    file: &str,
    dependencies: Vec<String>,
    dependent_count: usize,
    recent_modifications: u32,
    affected_themes: Vec<String>,
) -> ImpactReport {
    let score = score_impact(file, recent_modifications, dependent_count);
    ImpactReport {
        file: file.to_string(),
        recent_modifications,
        dependent_count,
        dependencies,
        affected_themes,
        score,
        level: ImpactLevel::from_score(score),
    }
}

/// Build the project-wide relationship map from scratch.
///
/// Nodes are the discovered source and test files; edges are their
/// resolved dependencies that land on other nodes. Dependencies resolving
/// outside the node set (data files, generated code) still count against
/// cluster cohesion but do not create graph nodes.
pub async fn map_relationships(root: &Path) -> Result<RelationshipMap> {
    let discovered = discovery::discover(root, &[], &[])?;

    let mut nodes: Vec<String> = discovered
        .source_files
        .iter()
        .chain(&discovered.tests)
        .cloned()
        .collect();
    nodes.sort();
    let node_set: HashSet<&String> = nodes.iter().collect();

    // Full resolved dependency lists, including targets outside the node set
    let mut all_deps: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for node in &nodes {
        let record = dependency::analyze(root, node).await;
        all_deps.insert(node.clone(), record.dependencies);
    }

    let mut dependency_graph: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut reverse_dependencies: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for node in &nodes {
        dependency_graph.entry(node.clone()).or_default();
        reverse_dependencies.entry(node.clone()).or_default();
    }
    for (node, deps) in &all_deps {
        for dep in deps {
            if node_set.contains(dep) && dep != node {
                dependency_graph.get_mut(node).unwrap().push(dep.clone());
                reverse_dependencies
                    .get_mut(dep)
                    .unwrap()
                    .push(node.clone());
            }
        }
    }
    for targets in dependency_graph.values_mut() {
        targets.sort();
        targets.dedup();
    }
    for sources in reverse_dependencies.values_mut() {
        sources.sort();
        sources.dedup();
    }

    let circular_dependencies = detect_cycles(&dependency_graph);
    let orphaned_files = find_orphans(&dependency_graph, &reverse_dependencies);
    let critical_files = find_critical_files(&reverse_dependencies);
    let file_clusters = find_clusters(&dependency_graph, &all_deps);

    let edge_count: usize = dependency_graph.values().map(Vec::len).sum();
    let statistics = GraphStatistics {
        file_count: nodes.len(),
        edge_count,
        cycle_count: circular_dependencies.len(),
        orphan_count: orphaned_files.len(),
        average_out_degree: if nodes.is_empty() {
            0.0
        } else {
            edge_count as f64 / nodes.len() as f64
        },
    };

    info!(
        "Mapped {} files, {} edges, {} cycles, {} orphans",
        statistics.file_count, statistics.edge_count, statistics.cycle_count,
        statistics.orphan_count
    );

    Ok(RelationshipMap {
        dependency_graph,
        reverse_dependencies,
        circular_dependencies,
        orphaned_files,
        critical_files,
        file_clusters,
        statistics,
    })
}

/// Depth-first cycle detection with an explicit recursion stack.
///
/// Revisiting a node on the active path records the path slice from that
/// node as a cycle. Cycles are canonicalized by rotating to start at the
/// lexicographically smallest member, which collapses rotations of the
/// same cycle into one entry.
fn detect_cycles(graph: &BTreeMap<String, Vec<String>>) -> Vec<Vec<String>> {
    let mut visited: HashSet<&String> = HashSet::new();
    let mut found: BTreeSet<Vec<String>> = BTreeSet::new();

    for start in graph.keys() {
        if visited.contains(start) {
            continue;
        }

        // (node, next child index) frames simulate the recursion stack
        let mut frames: Vec<(&String, usize)> = vec![(start, 0)];
        let mut path: Vec<&String> = vec![start];
        let mut on_path: HashSet<&String> = HashSet::from([start]);
        visited.insert(start);

        loop {
            let (node, child_idx) = match frames.last_mut() {
                Some(frame) => {
                    let idx = frame.1;
                    frame.1 += 1;
                    (frame.0, idx)
                }
                None => break,
            };
            let children = &graph[node];

            if child_idx < children.len() {
                let child = &children[child_idx];
                if on_path.contains(child) {
                    let pos = path.iter().position(|n| *n == child).unwrap();
                    let cycle: Vec<String> = path[pos..].iter().map(|s| (*s).clone()).collect();
                    found.insert(canonicalize_cycle(cycle));
                } else if !visited.contains(child) && graph.contains_key(child) {
                    visited.insert(child);
                    on_path.insert(child);
                    path.push(child);
                    frames.push((child, 0));
                }
            } else {
                on_path.remove(node);
                path.pop();
                frames.pop();
            }
        }
    }

    found.into_iter().collect()
}

fn canonicalize_cycle(cycle: Vec<String>) -> Vec<String> {
    if cycle.is_empty() {
        return cycle;
    }
    let min_idx = cycle
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map(|(i, _)| i)
        .unwrap();
    let mut rotated = cycle[min_idx..].to_vec();
    rotated.extend_from_slice(&cycle[..min_idx]);
    rotated
}

/// Files with zero in-edges and zero out-edges.
fn find_orphans(
    graph: &BTreeMap<String, Vec<String>>,
    reverse: &BTreeMap<String, Vec<String>>,
) -> Vec<String> {
    graph
        .iter()
        .filter(|(node, out)| {
            out.is_empty() && reverse.get(*node).map(Vec::is_empty).unwrap_or(true)
        })
        .map(|(node, _)| node.clone())
        .collect()
}

/// Files with at least [`CRITICAL_DEPENDENT_THRESHOLD`] reverse-dependents,
/// ranked by criticality = 2x direct + 0.5x transitive dependents plus
/// fixed bonuses for core-sounding names.
fn find_critical_files(reverse: &BTreeMap<String, Vec<String>>) -> Vec<CriticalFile> {
    let mut critical: Vec<CriticalFile> = reverse
        .iter()
        .filter(|(_, dependents)| dependents.len() >= CRITICAL_DEPENDENT_THRESHOLD)
        .map(|(file, dependents)| {
            let transitive = transitive_dependents(reverse, file);
            let criticality =
                2.0 * dependents.len() as f64 + 0.5 * transitive as f64 + name_bonus(file);
            CriticalFile {
                file: file.clone(),
                dependent_count: dependents.len(),
                criticality,
            }
        })
        .collect();

    critical.sort_by(|a, b| {
        b.criticality
            .partial_cmp(&a.criticality)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.file.cmp(&b.file))
    });
    critical
}

/// Breadth-first count of all transitive dependents, excluding the file
/// itself and its direct dependents.
fn transitive_dependents(reverse: &BTreeMap<String, Vec<String>>, file: &String) -> usize {
    let direct: HashSet<&String> = reverse[file].iter().collect();
    let mut seen: HashSet<&String> = direct.clone();
    seen.insert(file);
    let mut queue: VecDeque<&String> = reverse[file].iter().collect();
    let mut count = 0;

    while let Some(node) = queue.pop_front() {
        if let Some(dependents) = reverse.get(node) {
            for dep in dependents {
                if seen.insert(dep) {
                    count += 1;
                    queue.push_back(dep);
                }
            }
        }
    }
    count
}

fn name_bonus(file: &str) -> f64 {
    let stem = Path::new(file)
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let mut bonus = 0.0;
    if matches!(stem.as_str(), "main" | "index" | "lib" | "core" | "mod" | "app") {
        bonus += 2.0;
    }
    if file
        .split('/')
        .any(|seg| matches!(seg, "core" | "common" | "shared" | "utils" | "util"))
    {
        bonus += 1.0;
    }
    bonus
}

/// Connected components of the undirected graph via breadth-first search.
///
/// Cohesion counts directed edges among members against members' edges
/// that resolve outside the component (including dependency targets that
/// never became nodes). Singleton components are not clusters.
fn find_clusters(
    graph: &BTreeMap<String, Vec<String>>,
    all_deps: &BTreeMap<String, Vec<String>>,
) -> Vec<FileCluster> {
    let mut undirected: HashMap<&String, HashSet<&String>> = HashMap::new();
    for (node, targets) in graph {
        undirected.entry(node).or_default();
        for target in targets {
            undirected.entry(node).or_default().insert(target);
            undirected.entry(target).or_default().insert(node);
        }
    }

    let mut seen: HashSet<&String> = HashSet::new();
    let mut clusters = Vec::new();

    for node in graph.keys() {
        if seen.contains(node) {
            continue;
        }
        let mut members: Vec<&String> = Vec::new();
        let mut queue: VecDeque<&String> = VecDeque::from([node]);
        seen.insert(node);
        while let Some(current) = queue.pop_front() {
            members.push(current);
            if let Some(neighbors) = undirected.get(current) {
                for neighbor in neighbors {
                    if seen.insert(neighbor) {
                        queue.push_back(neighbor);
                    }
                }
            }
        }

        if members.len() < 2 {
            continue;
        }

        let member_set: HashSet<&&String> = members.iter().collect();
        let mut internal = 0usize;
        let mut external = 0usize;
        for member in &members {
            if let Some(deps) = all_deps.get(*member) {
                for dep in deps {
                    if member_set.contains(&dep) {
                        internal += 1;
                    } else {
                        external += 1;
                    }
                }
            }
        }
        let mut files: Vec<String> = members.iter().map(|s| (*s).clone()).collect();
        files.sort();
        let label = cluster_label(&files);
        let cohesion = if internal + external == 0 {
            0.0
        } else {
            internal as f64 / (internal + external) as f64
        };

        clusters.push(FileCluster {
            files,
            cohesion,
            label,
        });
    }

    clusters.sort_by(|a, b| b.files.len().cmp(&a.files.len()));
    debug!("Found {} clusters", clusters.len());
    clusters
}

/// Naive pattern label: shared directory prefix when one exists, dominant
/// file extension otherwise.
fn cluster_label(files: &[String]) -> Option<String> {
    let first = files.first()?;
    let mut prefix = first.as_str();
    for file in &files[1..] {
        while !file.starts_with(prefix) {
            prefix = match prefix.rfind('/') {
                Some(idx) => &prefix[..idx],
                None => "",
            };
            if prefix.is_empty() {
                break;
            }
        }
    }
    // Trim back to a directory boundary
    let dir_prefix = if prefix == first.as_str() {
        first.rfind('/').map(|idx| &first[..idx]).unwrap_or("")
    } else {
        prefix
    };
    if !dir_prefix.is_empty() {
        return Some(format!("{dir_prefix}/"));
    }

    let mut by_ext: HashMap<String, usize> = HashMap::new();
    for file in files {
        if let Some(ext) = Path::new(file).extension() {
            *by_ext.entry(ext.to_string_lossy().to_string()).or_default() += 1;
        }
    }
    by_ext
        .into_iter()
        .max_by_key(|(_, count)| *count)
        .map(|(ext, _)| format!("*.{ext}"))
}
