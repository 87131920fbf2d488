use anyhow::Result;

use upcrib_core::history::DesignStatus;

use super::utils;

fn status_marker(status: DesignStatus) -> &'static str {
    match status {
        DesignStatus::Generating => "⏳",
        DesignStatus::Completed => "✅",
        DesignStatus::Failed => "❌",
    }
}

pub async fn list() -> Result<()> {
    let store = utils::history_store()?;
    let designs = store.list().await?;

    if designs.is_empty() {
        println!("No saved designs yet.");
        println!("\n💡 Seed demo content with: upcrib history seed");
        return Ok(());
    }

    println!("{} saved design(s):", designs.len());
    for item in designs {
        println!(
            "  {} {}  {}  ({})",
            status_marker(item.status),
            item.session_id,
            item.title,
            item.created_at
        );
    }
    Ok(())
}

pub async fn show(session_id: &str) -> Result<()> {
    let store = utils::history_store()?;
    let Some(item) = store.get(session_id).await? else {
        println!("No design found for session {session_id}");
        return Ok(());
    };

    println!("{} {}", status_marker(item.status), item.title);
    println!("  session: {}", item.session_id);
    println!("  created: {}", item.created_at);
    println!("  image:   {}", item.thumbnail);
    if let Some(local) = &item.local_thumbnail_path {
        println!("  cached:  {local}");
    }
    if let Some(original) = &item.original_image {
        println!("  original: {original}");
    }
    if let Some(style) = &item.style_data {
        println!(
            "  style:   {} / {}",
            style.architectural_style, style.color_palette
        );
    }
    Ok(())
}

pub async fn rename(session_id: &str, title: &str) -> Result<()> {
    let store = utils::history_store()?;
    store.update_title(session_id, title).await?;
    println!("✅ Renamed {session_id} to '{title}'");
    Ok(())
}

pub async fn delete(session_id: &str, yes: bool) -> Result<()> {
    if !utils::confirm(&format!("Delete design {session_id}?"), yes)? {
        println!("Aborted.");
        return Ok(());
    }
    let store = utils::history_store()?;
    store.delete(session_id).await?;
    println!("✅ Deleted {session_id}");
    Ok(())
}

pub async fn clear(yes: bool) -> Result<()> {
    if !utils::confirm("Delete ALL saved designs?", yes)? {
        println!("Aborted.");
        return Ok(());
    }
    let store = utils::history_store()?;
    store.clear().await?;
    println!("✅ History cleared");
    Ok(())
}

pub async fn seed() -> Result<()> {
    let store = utils::history_store()?;
    if store.seed_if_empty().await? {
        println!("✅ Seeded demo designs");
    } else {
        println!("History is not empty; nothing seeded.");
    }
    Ok(())
}

pub async fn info() -> Result<()> {
    let store = utils::history_store()?;
    let info = store.storage_info().await?;

    println!("History storage:");
    println!(
        "  file:   {} ({})",
        info.history_file.display(),
        if info.history_file_exists { "exists" } else { "missing" }
    );
    println!(
        "  images: {} ({})",
        info.images_dir.display(),
        if info.images_dir_exists { "exists" } else { "missing" }
    );
    println!("  designs: {}", info.history_count);
    Ok(())
}
