//! End-to-end runs of figure units against generated workbooks.

use cortexfig::data::surface::{BrainAssets, Hemisphere};
use cortexfig::figures::{self, Figure};
use cortexfig::{run_batch, FailureMode, FigureConfig, FigureContext, FigureOutput, Style};
use neuroformats::{BrainMesh, FsCurv, FsCurvHeader, FsSurface, FsSurfaceHeader};
use rust_xlsxwriter::Workbook;
use std::path::Path;

enum Value {
    Text(&'static str),
    Number(f64),
}

use Value::{Number, Text};

fn write_sheet(path: &Path, sheets: &[(&str, &[&str], Vec<Vec<Value>>)]) {
    let mut workbook = Workbook::new();
    for (name, header, rows) in sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(*name).unwrap();
        for (col, title) in header.iter().enumerate() {
            sheet.write_string(0, col as u16, *title).unwrap();
        }
        for (r, row) in rows.iter().enumerate() {
            for (col, value) in row.iter().enumerate() {
                let r = r as u32 + 1;
                match value {
                    Text(s) => sheet.write_string(r, col as u16, *s).unwrap(),
                    Number(n) => sheet.write_number(r, col as u16, *n).unwrap(),
                };
            }
        }
    }
    workbook.save(path).unwrap();
}

fn context(root: &Path) -> FigureContext {
    let mut config = FigureConfig::default();
    config.paths.data_dir = root.join("data");
    config.paths.figures_dir = root.join("figures");
    std::fs::create_dir_all(&config.paths.data_dir).unwrap();
    FigureContext::from_config(&config)
}

fn write_s3(ctx: &FigureContext) {
    write_sheet(
        &ctx.data_dir.join("S3_data.xlsx"),
        &[(
            "Sheet1",
            &["sub", "epoch", "distance"],
            vec![
                vec![Number(1.0), Text("rightbaseline"), Number(2.0)],
                vec![Number(1.0), Text("rightbaseline"), Number(4.0)],
                vec![Number(2.0), Text("rightbaseline"), Number(6.0)],
                vec![Number(1.0), Text("leftbaseline"), Number(1.5)],
                vec![Number(2.0), Text("leftbaseline"), Number(2.5)],
            ],
        )],
    );
}

#[test]
fn s3_is_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(dir.path());
    write_s3(&ctx);
    std::fs::create_dir_all(&ctx.figures_dir).unwrap();

    let unit = figures::find("S3").unwrap();
    let first = unit.render(&ctx).unwrap();
    let second = unit.render(&ctx).unwrap();

    assert_eq!(first.artifacts.len(), 1);
    let artifact = &first.artifacts[0];
    assert!(artifact.path.ends_with("S3_task_epoch-hand_effect_sig_regions_ecc.svg"));
    assert!(artifact.bytes > 0);
    assert_eq!(artifact.sha256, second.artifacts[0].sha256);

    // subject means 3 and 6 average to 4.5
    assert_eq!(first.stats["rightbaseline.mean"], 4.5);
    assert_eq!(first.stats["leftbaseline.mean"], 2.0);
    assert_eq!(first.stats, second.stats);
}

#[test]
fn s4_writes_both_panels_stats() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(dir.path());
    let rows = || {
        vec![
            vec![Text("leftbaseline"), Number(-0.2)],
            vec![Text("leftbaseline"), Number(0.0)],
            vec![Text("lefttransfer-late"), Number(0.3)],
        ]
    };
    write_sheet(
        &ctx.data_dir.join("S4_data.xlsx"),
        &[
            ("hand_sig_regions_bold", &["epoch", "tmean"], rows()),
            ("task_epoch_sig_regions_bold", &["epoch", "tmean"], rows()),
        ],
    );

    let report = run_batch(&figures::select(&["S4".to_string()]).unwrap(), &ctx, FailureMode::Continue).unwrap();
    assert!(report.all_succeeded());
    let out = report.outcomes[0].result.as_ref().unwrap();
    assert!((out.stats["hand.leftbaseline.mean"] + 0.1).abs() < 1e-12);
    assert_eq!(out.stats["task_epoch.lefttransfer-late.mean"], 0.3);
    assert!(ctx.figures_dir.join("S4_average_bold_across_significant_regions.svg").is_file());
}

#[test]
fn batch_continues_past_missing_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(dir.path());
    ctx.save_stats = true;
    write_s3(&ctx);

    let selected: Vec<Box<dyn Figure>> = figures::select(&["1B".to_string(), "S3".to_string()]).unwrap();
    let report = run_batch(&selected, &ctx, FailureMode::Continue).unwrap();

    assert_eq!(report.outcomes.len(), 2);
    assert!(!report.all_succeeded());
    let failed = report.failed();
    assert_eq!(failed[0].id, "1B");
    assert!(failed[0].result.as_ref().unwrap_err().contains("1B_data.xlsx"));
    assert!(report.outcomes[1].succeeded());
    assert!(ctx.figures_dir.join("S3_stats.json").is_file());

    let report = run_batch(&selected, &ctx, FailureMode::FailFast).unwrap();
    assert_eq!(report.outcomes.len(), 1);
}

#[test]
fn missing_sheet_is_reported_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(dir.path());
    write_sheet(
        &ctx.data_dir.join("S4_data.xlsx"),
        &[("hand_sig_regions_bold", &["epoch", "tmean"], vec![vec![Text("leftbaseline"), Number(0.1)]])],
    );
    std::fs::create_dir_all(&ctx.figures_dir).unwrap();
    let err = figures::find("S4").unwrap().render(&ctx).unwrap_err();
    assert!(err.to_string().contains("task_epoch_sig_regions_bold"));
}

#[test]
fn registry_lists_every_unit() {
    let ids: Vec<&str> = figures::registry().iter().map(|f| f.id()).collect();
    assert_eq!(ids, ["1B", "3E", "4E", "6BD", "8", "9B", "S3", "S4", "S7BE"]);
    assert!(figures::find("s7be").is_ok());
    assert!(figures::find("5E").is_err());
}

fn render(id: &str, ctx: &FigureContext) -> FigureOutput {
    std::fs::create_dir_all(&ctx.figures_dir).unwrap();
    let out = figures::find(id).unwrap().render(ctx).unwrap();
    for artifact in &out.artifacts {
        assert!(artifact.path.is_file(), "{} was not written", artifact.path.display());
        assert!(artifact.bytes > 0);
    }
    out
}

fn svg_text(out: &FigureOutput, file: &str) -> String {
    let artifact = out.artifacts.iter().find(|a| a.path.ends_with(file)).unwrap();
    std::fs::read_to_string(&artifact.path).unwrap()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn fig_1b_bars_use_every_row_and_test_paired_subjects() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(dir.path());
    let binned = |sub: f64, block: f64, bin: f64, err: f64| vec![Number(sub), Number(block), Number(bin), Number(err)];
    let early = |sub: f64, epoch: &'static str, err: f64| vec![Number(sub), Text(epoch), Number(err)];
    write_sheet(
        &ctx.data_dir.join("1B_data.xlsx"),
        &[
            (
                "binned_learning_curve",
                &["SubNo", "BlockNo", "TrialBlock", "AngularError"],
                vec![
                    binned(1.0, 1.0, 1.0, 10.0),
                    binned(1.0, 1.0, 2.0, 20.0),
                    binned(1.0, 3.0, 3.0, 40.0),
                    binned(1.0, 3.0, 4.0, 25.0),
                    binned(1.0, 5.0, 5.0, 5.0),
                    binned(2.0, 1.0, 1.0, 14.0),
                    binned(2.0, 1.0, 2.0, 18.0),
                    binned(2.0, 3.0, 3.0, 36.0),
                    binned(2.0, 3.0, 4.0, 21.0),
                    binned(2.0, 5.0, 5.0, 3.0),
                ],
            ),
            (
                "rh_vs_lh_early_error",
                &["SubNo", "Epoch", "AngularError"],
                vec![
                    early(1.0, "rightlearning-early", 30.0),
                    early(1.0, "lefttransfer-early", 10.0),
                    early(2.0, "rightlearning-early", 28.0),
                    early(2.0, "lefttransfer-early", 12.0),
                    early(3.0, "rightlearning-early", 40.0),
                    early(3.0, "lefttransfer-early", 11.0),
                    // no transfer epoch: in the bar, not in the test
                    early(4.0, "rightlearning-early", 50.0),
                ],
            ),
        ],
    );

    let out = render("1B", &ctx);
    assert_eq!(out.artifacts.len(), 2);
    assert_eq!(out.stats["binned.blocks"], 3.0);
    assert!(close(out.stats["early_error.rightlearning-early.mean"], 37.0));
    assert!(close(out.stats["early_error.lefttransfer-early.mean"], 11.0));
    assert!(out.stats["early_error.t"] > 0.0);
    assert!(out.stats["early_error.p"] < 0.05);

    let svg = svg_text(&out, "1B_task_RH-LH_early_error.svg");
    assert!(svg.contains(">RH Learning Early\n"));
    assert!(svg.contains(">LH Transfer Early\n"));
    assert!(svg_text(&out, "1B_task_plot_binned.svg").contains(">Report\n"));
}

#[test]
fn fig_3e_summarises_models_and_pairs() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(dir.path());
    let row = |values: &[f64]| values.iter().map(|v| Number(*v)).collect::<Vec<_>>();
    write_sheet(
        &ctx.data_dir.join("3E_data.xlsx"),
        &[
            (
                "evaluations",
                &["motor", "visual", "cognitive"],
                vec![row(&[0.2, 0.5, 0.7]), row(&[0.4, 0.7, 0.9])],
            ),
            (
                "models_summary",
                &["p_0", "p_NC"],
                vec![row(&[0.01, 0.5]), row(&[0.2, 0.001]), row(&[0.01, 0.01])],
            ),
            (
                "models_comparison_fdr",
                &["model", "motor", "visual", "cognitive"],
                vec![
                    vec![Text("motor"), Number(1.0), Number(0.01), Number(0.2)],
                    vec![Text("visual"), Number(0.01), Number(1.0), Number(0.03)],
                    vec![Text("cognitive"), Number(0.2), Number(0.03), Number(1.0)],
                ],
            ),
        ],
    );

    let out = render("3E", &ctx);
    assert_eq!(out.artifacts.len(), 1);
    assert!((out.stats["motor.mean"] - 0.3).abs() < 1e-12);
    assert!((out.stats["cognitive.mean"] - 0.8).abs() < 1e-12);
    assert_eq!(out.stats["pairwise_significant"], 2.0);
    let svg = svg_text(&out, "3E_rsa_models_comparison.svg");
    assert!(svg.contains(">visual\n"));
    assert_eq!(svg.matches(">**\n").count(), 2);
}

#[test]
fn fig_6bd_marks_significant_reexpression() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(dir.path());
    let ecc = || {
        vec![
            vec![Text("rightlearning-late"), Number(0.2)],
            vec![Text("rightlearning-late"), Number(0.4)],
            vec![Text("lefttransfer-early"), Number(0.1)],
            vec![Text("lefttransfer-late"), Number(0.0)],
            // off the axis, but still sets the bracket height
            vec![Text("rightbaseline"), Number(0.9)],
        ]
    };
    let posthoc = |p: f64| {
        vec![
            vec![Text("lefttransfer-early"), Text("rightlearning-late"), Number(p)],
            vec![Text("lefttransfer-late"), Text("rightlearning-late"), Number(0.3)],
        ]
    };
    write_sheet(
        &ctx.data_dir.join("6BD_data.xlsx"),
        &[
            ("epoch_sig_regions_eccentricity", &["epoch", "distance"], ecc()),
            ("epoch_re_expression", &["A", "B", "p-unc"], posthoc(0.01)),
            ("hand_sig_regions_eccentricity", &["epoch", "distance"], ecc()),
            ("hand_re_expression", &["A", "B", "p-unc"], posthoc(0.2)),
        ],
    );

    let out = render("6BD", &ctx);
    assert!(close(out.stats["epoch.rightlearning-late.mean"], 0.3));
    assert_eq!(out.stats["epoch.lefttransfer-late.mean"], 0.0);
    assert_eq!(out.stats["epoch.significant_pairs"], 1.0);
    assert_eq!(out.stats["hand.significant_pairs"], 0.0);
    let svg = svg_text(&out, "6BD_task_epoch_hand_reexpression.svg");
    assert_eq!(svg.matches(">*\n").count(), 1);
    assert!(svg.contains(">Task Epoch\n"));
}

#[test]
fn fig_8_facets_every_seed() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(dir.path());
    let rows = |base: f64| {
        vec![
            vec![Text("leftbaseline"), Number(base)],
            vec![Text("leftbaseline"), Number(base + 1.0)],
            vec![Text("rightlearning-early"), Number(base + 2.0)],
            vec![Text("lefttransfer-late"), Number(base + 3.0)],
        ]
    };
    write_sheet(
        &ctx.data_dir.join("8_data.xlsx"),
        &[
            ("Left M1", &["epoch", "distance"], rows(1.0)),
            ("Right M1", &["epoch", "distance"], rows(2.0)),
            ("Left mPFC", &["epoch", "distance"], rows(3.0)),
            ("Right mPFC", &["epoch", "distance"], rows(4.0)),
        ],
    );

    let out = render("8", &ctx);
    assert_eq!(out.stats["Left M1.leftbaseline.mean"], 1.5);
    assert_eq!(out.stats["Right mPFC.lefttransfer-late.mean"], 7.0);
    assert!(!out.stats.contains_key("Left M1.rightbaseline.mean"));
    let svg = svg_text(&out, "8_seeds_eccentricity.svg");
    assert!(svg.contains(">Left mPFC\n"));
    assert!(svg.contains(">LH Transfer Late\n"));
}

#[test]
fn fig_9b_reports_medians_and_correlation() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(dir.path());
    let row = |sub: f64, rh: f64, lh: f64, transfer: f64| vec![Number(sub), Number(rh), Number(lh), Number(transfer)];
    write_sheet(
        &ctx.data_dir.join("9B_data.xlsx"),
        &[(
            "Sheet1",
            &["sub", "RH Early", "LH Early", "Transfer"],
            vec![
                row(1.0, 10.0, 5.0, 21.0),
                row(2.0, 20.0, 6.0, 41.0),
                row(3.0, 30.0, 7.0, 61.0),
                row(4.0, 40.0, 8.0, 81.0),
            ],
        )],
    );

    let out = render("9B", &ctx);
    assert_eq!(out.stats["RH Early.median"], 25.0);
    assert_eq!(out.stats["LH Early.median"], 6.5);
    assert!((out.stats["RH Early.Transfer.pearson_r"] - 1.0).abs() < 1e-12);
    assert!(svg_text(&out, "9B_behaviour_distributions.svg").contains(">Transfer (°)\n"));
}

#[test]
fn fig_s7be_reads_the_permutation_columns() {
    const N_PERM: usize = 1000;
    let dir = tempfile::tempdir().unwrap();
    let ctx = context(dir.path());
    let mut header: Vec<String> = ["hemi", "network", "r", "pspin_fdr"].iter().map(|s| s.to_string()).collect();
    header.extend((0..N_PERM).map(|i| i.to_string()));
    let header: Vec<&str> = header.iter().map(String::as_str).collect();
    let row = |hemi: &'static str, network: &'static str, r: f64, p: f64| {
        let mut cells = vec![Text(hemi), Text(network), Number(r), Number(p)];
        cells.extend((0..N_PERM).map(|k| Number((k as f64 / N_PERM as f64 - 0.5) * 0.4)));
        cells
    };
    let rows = || {
        vec![
            row("LH", "Vis", 0.3, 0.01),
            row("LH", "SomMot", -0.1, 0.4),
            row("RH", "Vis", 0.1, 0.5),
        ]
    };
    write_sheet(
        &ctx.data_dir.join("S7BE_data.xlsx"),
        &[
            ("rightlearning-early_error_spins", header.as_slice(), rows()),
            ("lefttransfer-early_error_spins", header.as_slice(), rows()),
        ],
    );

    let out = render("S7BE", &ctx);
    assert_eq!(out.artifacts.len(), 2);
    assert_eq!(out.stats["S7B.LH.significant_networks"], 1.0);
    assert_eq!(out.stats["S7B.RH.significant_networks"], 0.0);
    assert_eq!(out.stats["S7E.LH.significant_networks"], 1.0);
    let svg = svg_text(&out, "S7B_RH_Learning_permutations.svg");
    assert!(svg.contains(">SomMot\n"));
    assert!(svg.contains(">Spatial Correlation\n"));
}

const ATLAS: &str = "toy";

fn octahedron(offset: f32) -> (Vec<f32>, Vec<i32>) {
    let vertices = [
        [offset + 1.0, 0.0, 0.0],
        [offset - 1.0, 0.0, 0.0],
        [offset, 1.0, 0.0],
        [offset, -1.0, 0.0],
        [offset, 0.0, 1.0],
        [offset, 0.0, -1.0],
    ];
    let faces = [
        [0, 2, 4],
        [2, 1, 4],
        [1, 3, 4],
        [3, 0, 4],
        [2, 0, 5],
        [1, 2, 5],
        [3, 1, 5],
        [0, 3, 5],
    ];
    (vertices.concat(), faces.concat())
}

/// Colortable code of an annotation entry.
fn annot_code(rgba: [i32; 4]) -> i32 {
    rgba[0] + rgba[1] * (1 << 8) + rgba[2] * (1 << 16) + rgba[3] * (1 << 24)
}

fn put_i32(buf: &mut Vec<u8>, v: i32) {
    buf.extend_from_slice(&v.to_be_bytes());
}

fn put_name(buf: &mut Vec<u8>, s: &str) {
    put_i32(buf, s.len() as i32 + 1);
    buf.extend_from_slice(s.as_bytes());
    buf.push(0);
}

/// A version 2 FreeSurfer annotation: the first `labelled` vertices belong
/// to `region`, the rest to the unknown entry.
fn write_annot(path: &Path, region: &str, labelled: usize, n_vertices: usize) {
    let unknown = [25, 5, 25, 0];
    let color = [120, 18, 134, 0];
    let mut buf = Vec::new();

    put_i32(&mut buf, n_vertices as i32);
    for v in 0..n_vertices {
        put_i32(&mut buf, v as i32);
        put_i32(&mut buf, annot_code(if v < labelled { color } else { unknown }));
    }
    put_i32(&mut buf, 1);
    put_i32(&mut buf, -2);
    put_i32(&mut buf, 2);
    put_name(&mut buf, "toy.ctab");
    put_i32(&mut buf, 2);
    for (id, (entry, rgba)) in [("Unknown", unknown), (region, color)].into_iter().enumerate() {
        put_i32(&mut buf, id as i32);
        put_name(&mut buf, entry);
        for c in rgba {
            put_i32(&mut buf, c);
        }
    }
    std::fs::write(path, buf).unwrap();
}

fn write_brain_assets(dir: &Path) {
    std::fs::create_dir_all(dir).unwrap();
    for (hemi, offset, region) in [("lh", -2.0, "LH_Vis_1"), ("rh", 2.0, "RH_Vis_1")] {
        let (vertices, faces) = octahedron(offset);
        let surf = FsSurface {
            header: FsSurfaceHeader {
                num_vertices: 6,
                num_faces: 8,
                ..FsSurfaceHeader::default()
            },
            mesh: BrainMesh { vertices, faces },
        };
        neuroformats::write_surf(&dir.join(format!("{hemi}.inflated")), &surf).unwrap();

        let curv = FsCurv {
            header: FsCurvHeader {
                num_vertices: 6,
                num_faces: 8,
                ..FsCurvHeader::default()
            },
            data: vec![-1.0, 1.0, 0.5, -0.5, 0.0, 0.25],
        };
        neuroformats::write_curv(&dir.join(format!("{hemi}.sulc")), &curv);

        write_annot(&dir.join(format!("{hemi}.{ATLAS}.annot")), region, 4, 6);
    }
}

#[test]
fn brain_assets_load_from_freesurfer_files() {
    let dir = tempfile::tempdir().unwrap();
    write_brain_assets(dir.path());
    let mut surface = FigureConfig::default().surface;
    surface.atlas = ATLAS.to_string();

    let assets = BrainAssets::load(dir.path(), &surface).unwrap();
    assert_eq!(assets.meshes.left.num_vertices(), 6);
    assert_eq!(assets.meshes.right.faces()[1], [2usize, 1, 4]);
    assert_eq!(assets.meshes.left.vertices()[0], [-1.0f32, 0.0, 0.0]);
    assert_eq!(assets.sulc.right[2], 0.5);

    let atlas = &assets.atlas;
    assert_eq!(atlas.name(), ATLAS);
    let names: Vec<&str> = atlas.regions().iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["LH_Vis_1", "RH_Vis_1"]);
    assert_eq!(atlas.region_by_name("RH_Vis_1").unwrap().hemisphere, Hemisphere::Right);
    assert_eq!(atlas.labels(Hemisphere::Left), [1u32, 1, 1, 1, 0, 0]);
    assert_eq!(atlas.labels(Hemisphere::Right), [2u32, 2, 2, 2, 0, 0]);

    // an annotation for a different mesh size is rejected
    write_annot(&dir.path().join(format!("rh.{ATLAS}.annot")), "RH_Vis_1", 4, 5);
    let err = BrainAssets::load(dir.path(), &surface).unwrap_err();
    assert!(err.to_string().contains("5 labels for a 6-vertex mesh"));
}

fn write_4e(ctx: &FigureContext) {
    let contrast = |t: f64, roi: f64, sig: f64| vec![Text("right"), Text("left"), Number(t), Number(roi), Number(sig)];
    let ecc = |hemi: &'static str, sub: f64, epoch: &'static str, d: f64| {
        vec![Text(hemi), Number(sub), Text(epoch), Number(d)]
    };
    write_sheet(
        &ctx.data_dir.join("4E_data.xlsx"),
        &[
            (
                "hand_effect_right_vs_left",
                &["A", "B", "T", "roi_ix", "sig_corrected"],
                vec![contrast(3.0, 1.0, 1.0), contrast(-2.0, 2.0, 1.0), contrast(5.0, 1.0, 0.0)],
            ),
            (
                "right_vs_left_eccentricity",
                &["hemi", "sub", "epoch", "distance"],
                vec![
                    ecc("LH", 1.0, "rightbaseline", 2.0),
                    ecc("LH", 2.0, "rightbaseline", 3.0),
                    ecc("RH", 1.0, "leftbaseline", 2.5),
                ],
            ),
        ],
    );
}

#[test]
fn fig_4e_maps_contrasts_onto_the_surface() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(dir.path());
    ctx.style = Style::new(30);
    ctx.surface.atlas = ATLAS.to_string();
    write_4e(&ctx);
    write_brain_assets(&ctx.resources_dir);

    let out = render("4E", &ctx);
    assert_eq!(out.artifacts.len(), 4);
    assert_eq!(out.stats["right_vs_left.mapped_regions"], 2.0);
    assert_eq!(out.stats["ecc.LH.rightbaseline.mean"], 2.5);
    assert!(ctx.figures_dir.join("4E_right_vs_left_dorsal.svg").is_file());
    assert!(ctx.figures_dir.join("4E_right_vs_left_posterior.svg").is_file());
    assert!(!svg_text(&out, "4E_right_vs_left.svg").contains(">6.11\n"));

    ctx.surface.colorbar = true;
    let out = render("4E", &ctx);
    assert!(svg_text(&out, "4E_right_vs_left.svg").contains(">6.11\n"));
}
