//! Scene preparation commands.

use std::path::PathBuf;

use turntable_scene_tools::{create_root_and_reparent, remove_empties_and_merge};

use super::{load_document, recording_host, save_document};

pub fn clean_merge(path: PathBuf) -> anyhow::Result<()> {
    let mut loaded = load_document(&path)?;
    let before = loaded.document.scene.len();

    let mut host = recording_host(&loaded);
    let report = remove_empties_and_merge(&mut host)?;

    loaded.document.scene = host.into_scene();
    save_document(&mut loaded)?;

    println!("Deleted {} empt(ies)", report.deleted_empties);
    match report.survivor.and_then(|id| loaded.document.scene.object(id)) {
        Some(survivor) => println!(
            "Merged {} mesh(es) into '{}'",
            report.merged_meshes, survivor.name
        ),
        None => println!("Fewer than two meshes selected; nothing merged"),
    }
    println!(
        "Objects: {} -> {}",
        before,
        loaded.document.scene.len()
    );

    Ok(())
}

pub fn create_root(path: PathBuf, keep_transform: bool) -> anyhow::Result<()> {
    let mut loaded = load_document(&path)?;
    let keep = keep_transform || loaded.document.render_config.compensate_reparent;

    let mut host = recording_host(&loaded);
    let report = create_root_and_reparent(&mut host, keep)?;

    loaded.document.scene = host.into_scene();
    save_document(&mut loaded)?;

    println!(
        "Created '{}' and parented {} object(s) to it{}",
        report.root_name,
        report.reparented.len(),
        if keep { " (world transforms kept)" } else { "" }
    );

    Ok(())
}
