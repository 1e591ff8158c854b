//! End-to-end checks of the process protocol against stand-in executables.
//!
//! The stand-ins are small `sh` scripts that drain stdin and print a fixed answer.
//! All of them are written once, before any test spawns a process.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use lattri::api::{
    all_triangulations, all_triangulations_raw, mother_of_all_examples, p2_fan, reflexive_square,
    EnumerateOpts,
};
use lattri::prelude::*;

const SQUARE_NON_STAR: &str = "{{0,1,2},{0,1,4},{0,2,5},{0,4,6},{0,5,8},{0,6,7},{0,7,8},{2,3,5}}";
const MOTHER_REGULAR: &str = "{{0,1,3},{0,2,3},{1,2,4},{1,3,4},{2,3,5},{2,4,5},{3,4,5}}";
const MOTHER_IRREGULAR: &str = "{{0,1,3},{0,2,5},{0,3,5},{1,2,4},{1,3,4},{2,4,5},{3,4,5}}";

struct FakeTools {
    _root: tempfile::TempDir,
    good: PathBuf,
    failing: PathBuf,
    noisy: PathBuf,
    garbled: PathBuf,
    empty: PathBuf,
}

fn script(dir: &Path, name: &str, body: &str) {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\ncat > /dev/null\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
}

fn fake_tools() -> &'static FakeTools {
    static TOOLS: OnceLock<FakeTools> = OnceLock::new();
    TOOLS.get_or_init(|| {
        let root = tempfile::tempdir().unwrap();
        let dir = |name: &str| {
            let d = root.path().join(name);
            fs::create_dir(&d).unwrap();
            d
        };
        let (good, failing, noisy, garbled, empty) =
            (dir("good"), dir("failing"), dir("noisy"), dir("garbled"), dir("empty"));

        script(&good, "topcom-points2finetriang", &format!("echo '{SQUARE_NON_STAR}'"));
        script(
            &good,
            "topcom-points2flips",
            &format!("echo '{MOTHER_IRREGULAR}'\necho\necho '{MOTHER_REGULAR}'"),
        );
        script(
            &good,
            "topcom-points2alltriangs",
            &format!(
                "echo 'Evaluating Commandline Options ...'\n\
                 echo 'T[1] := {MOTHER_REGULAR};'\n\
                 echo 'T[2] := {MOTHER_IRREGULAR};'"
            ),
        );
        script(&good, "cgal-triangulate-2d", "echo '[[0, 1, 2], [0, 1, 3], [0, 2, 3]]'");

        script(&failing, "topcom-points2flips", "exit 3");
        script(&failing, "topcom-points2alltriangs", "exit 3");
        script(&noisy, "cgal-triangulate-2d", "echo 'precision loss' >&2\necho '[[0, 1, 2]]'");
        script(&garbled, "cgal-triangulate-2d", "echo 'not a triangulation'");

        FakeTools {
            _root: root,
            good,
            failing,
            noisy,
            garbled,
            empty,
        }
    })
}

fn tools_in(dir: &Path) -> Toolchain {
    let mut tools = Toolchain::default();
    tools.cgal_dir = dir.to_path_buf();
    tools.topcom_dir = dir.to_path_buf();
    tools
}

fn all(n: usize) -> Vec<usize> {
    (0..n).collect()
}

#[test]
fn topcom_star_matches_native_star() {
    let tools = tools_in(&fake_tools().good);
    let poly = Arc::new(reflexive_square());
    let mut topcom = Triangulation::new(
        Arc::clone(&poly),
        &all(9),
        TriangulateOpts::default()
            .backend(Backend::Topcom)
            .star(true)
            .tools(tools.clone()),
    )
    .unwrap();
    let native = Triangulation::new(
        poly,
        &all(9),
        TriangulateOpts::default().star(true).tools(tools),
    )
    .unwrap();
    assert_eq!(topcom, native);
    assert!(topcom.known_heights().is_none());
    assert!(topcom.is_star());
    assert!(topcom.is_regular().unwrap());
}

#[test]
fn topcom_without_star_keeps_the_tool_answer() {
    let tools = tools_in(&fake_tools().good);
    let mut t = Triangulation::new(
        Arc::new(reflexive_square()),
        &all(9),
        TriangulateOpts::default().backend(Backend::Topcom).tools(tools),
    )
    .unwrap();
    assert_eq!(t.simplices().len(), 8);
    assert!(t.is_fine());
    assert!(!t.is_star());
}

#[test]
fn cgal_backend_reads_simplices() {
    let tools = tools_in(&fake_tools().good);
    let mut t = Triangulation::new(
        Arc::new(p2_fan()),
        &all(4),
        TriangulateOpts::default()
            .backend(Backend::Cgal)
            .star(true)
            .tools(tools),
    )
    .unwrap();
    let fan: Vec<Vec<usize>> = vec![vec![0, 1, 2], vec![0, 1, 3], vec![0, 2, 3]];
    assert_eq!(t.simplices(), fan.as_slice());
    assert!(t.is_star());
    assert_eq!(t.backend(), Backend::Cgal);
}

#[test]
fn cgal_failures_are_reported() {
    let fake = fake_tools();
    let build = |dir: &Path| {
        Triangulation::new(
            Arc::new(p2_fan()),
            &all(4),
            TriangulateOpts::default()
                .backend(Backend::Cgal)
                .tools(tools_in(dir)),
        )
    };
    assert!(matches!(build(&fake.noisy), Err(TriangError::Tool { .. })));
    assert!(matches!(build(&fake.garbled), Err(TriangError::Parse { .. })));
    assert!(matches!(build(&fake.empty), Err(TriangError::Tool { .. })));
}

#[test]
fn topcom_flips_feed_neighbors() {
    let fake = fake_tools();
    let regular: Vec<Vec<usize>> = vec![
        vec![0, 1, 3],
        vec![0, 2, 3],
        vec![1, 2, 4],
        vec![1, 3, 4],
        vec![2, 3, 5],
        vec![2, 4, 5],
        vec![3, 4, 5],
    ];
    let build = |dir: &Path| {
        Triangulation::new(
            Arc::new(mother_of_all_examples()),
            &all(6),
            TriangulateOpts::with_simplices(regular.clone()).tools(tools_in(dir)),
        )
        .unwrap()
    };
    let mut t = build(&fake.good);
    let neighbors = t.neighbor_triangulations(NeighborFilter::default()).unwrap();
    assert_eq!(neighbors.len(), 2);
    let regular_only = t
        .neighbor_triangulations(NeighborFilter::new(false, true, false))
        .unwrap();
    assert_eq!(regular_only.len(), 1);

    let mut failing = build(&fake.failing);
    assert!(failing
        .neighbor_triangulations(NeighborFilter::default())
        .unwrap()
        .is_empty());
}

#[test]
fn enumeration_filters_regular_triangulations() {
    let fake = fake_tools();
    let poly = Arc::new(mother_of_all_examples());
    let tools = tools_in(&fake.good);
    let raw = all_triangulations_raw(&poly, &all(6), EnumerateOpts::default(), &tools).unwrap();
    assert_eq!(raw.len(), 2);

    let opts = EnumerateOpts {
        only_regular: true,
        ..EnumerateOpts::default()
    };
    let regular = all_triangulations(Arc::clone(&poly), &all(6), opts, &tools).unwrap();
    assert_eq!(regular.len(), 1);

    let star_without_origin = EnumerateOpts {
        only_star: true,
        ..EnumerateOpts::default()
    };
    assert!(matches!(
        all_triangulations_raw(&poly, &all(6), star_without_origin, &tools),
        Err(TriangError::InvalidInput { .. })
    ));

    let failing = tools_in(&fake.failing);
    assert!(matches!(
        all_triangulations(poly, &all(6), EnumerateOpts::default(), &failing),
        Err(TriangError::Tool { .. })
    ));
}
