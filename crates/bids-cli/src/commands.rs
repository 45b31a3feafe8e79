use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use comfy_table::Table;
use tracing::info_span;

use bids_model::SCAN_TAXONOMY;

use crate::cli::{EnrichArgs, OrganizeArgs, RunArgs};
use crate::config::RunConfig;
use crate::pipeline::{EnrichParams, OrganizeOptions, enrich, organize};
use crate::summary::apply_table_style;
use crate::types::CurateSummary;

pub fn run_organize(args: &OrganizeArgs, config: &RunConfig) -> Result<CurateSummary> {
    let bids_dir = require_path(
        args.bids_dir.as_deref(),
        config.paths.bids_dir.as_deref(),
        "acquisition tree (BIDS_DIR argument or [paths].bids_dir)",
    )?;
    let options = organize_options(args.skip_convert, args.no_compress, config);
    let result = organize(&bids_dir, options)?;
    Ok(CurateSummary {
        organize: Some(result),
        enrich: None,
    })
}

pub fn run_enrich(args: &EnrichArgs, config: &RunConfig) -> Result<CurateSummary> {
    let skeleton = require_path(
        args.skeleton.as_deref(),
        config.tables.skeleton.as_deref(),
        "skeleton table (--skeleton or [tables].skeleton)",
    )?;
    let key_map = require_path(
        args.key_map.as_deref(),
        config.tables.key_map.as_deref(),
        "key map (--key-map or [tables].key_map)",
    )?;
    let bids_dir = require_path(
        args.bids_dir.as_deref(),
        config.paths.bids_dir.as_deref(),
        "acquisition tree (--bids-dir or [paths].bids_dir)",
    )?;
    let mirror_dir = args
        .mirror_dir
        .clone()
        .or_else(|| config.paths.mirror_dir.clone())
        .unwrap_or_else(|| bids_dir.clone());

    let result = enrich(EnrichParams {
        skeleton: &skeleton,
        key_map: &key_map,
        source_root: &bids_dir,
        mirror_root: &mirror_dir,
    })?;
    Ok(CurateSummary {
        organize: None,
        enrich: Some(result),
    })
}

pub fn run_pipeline(args: &RunArgs, config: &RunConfig) -> Result<CurateSummary> {
    let span = info_span!("pipeline");
    let _guard = span.enter();

    // Configuration-level inputs are checked before the organize stage
    // mutates anything.
    let skeleton = require_path(
        args.skeleton.as_deref(),
        config.tables.skeleton.as_deref(),
        "skeleton table (--skeleton or [tables].skeleton)",
    )?;
    if !skeleton.is_file() {
        return Err(anyhow!("skeleton table not found: {}", skeleton.display()));
    }
    let key_map = require_path(
        args.key_map.as_deref(),
        config.tables.key_map.as_deref(),
        "key map (--key-map or [tables].key_map)",
    )?;
    if !key_map.is_file() {
        return Err(anyhow!("key map not found: {}", key_map.display()));
    }

    let organize_args = OrganizeArgs {
        bids_dir: args.bids_dir.clone(),
        skip_convert: args.skip_convert,
        no_compress: args.no_compress,
    };
    let organized = run_organize(&organize_args, config)?;

    let enrich_args = EnrichArgs {
        skeleton: args.skeleton.clone(),
        bids_dir: args.bids_dir.clone(),
        mirror_dir: args.mirror_dir.clone(),
        key_map: args.key_map.clone(),
    };
    let enriched = run_enrich(&enrich_args, config)?;

    Ok(CurateSummary {
        organize: organized.organize,
        enrich: enriched.enrich,
    })
}

pub fn run_taxonomy() {
    let mut table = Table::new();
    table.set_header(vec!["Scan type", "Image description", "Subfolder"]);
    apply_table_style(&mut table);
    for entry in &SCAN_TAXONOMY {
        table.add_row(vec![
            entry.class.scan_type(),
            entry.image_description,
            entry.class.modality().relative_path(),
        ]);
    }
    println!("{table}");
}

fn organize_options(skip_convert: bool, no_compress: bool, config: &RunConfig) -> OrganizeOptions {
    OrganizeOptions {
        run_converter: config.processing.run_converter && !skip_convert,
        compress: config.processing.compress_nifti && !no_compress,
    }
}

fn require_path(
    arg: Option<&Path>,
    config: Option<&Path>,
    description: &str,
) -> Result<PathBuf> {
    arg.or(config)
        .map(Path::to_path_buf)
        .ok_or_else(|| anyhow!("missing {description}"))
}
