use std::{env, path::PathBuf};

use controller_persist::{
    RestartSignal,
    config::PersistConfig,
    controller::{autosave::spawn_autosave, init_logging, load_or_fresh, share},
};
use log::info;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = match env::args().nth(1) {
        Some(path) => PersistConfig::from_file(&PathBuf::from(path))?,
        None => PersistConfig::default(),
    };

    init_logging(&PathBuf::from("./controller-logs"), &config.log_level, false);

    let state = share(load_or_fresh(&config.state_path, config.max_tracked_files)?);
    let restart = RestartSignal::new();
    let autosave = spawn_autosave(
        state.clone(),
        config.state_path.clone(),
        config.autosave_interval(),
        restart.clone(),
    );

    for i in 0..25 {
        let mut persist = state.lock().await;
        let name = format!("episode-{i:02}.mkv");
        if let Some(evicted) = persist.downloaded_file_names.add(name.clone()) {
            info!("No longer tracking {evicted}");
        }
        if i % 3 == 0 {
            persist.extracted_file_names.add(name);
        }
        drop(persist);
        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
    }

    // Files deleted on the remote side are forgotten
    state
        .lock()
        .await
        .downloaded_file_names
        .difference_update(["episode-20.mkv"]);

    restart.set();
    autosave.await??;

    let stats = state.lock().await.get_eviction_stats();
    println!("Eviction stats: {}", serde_json::to_string(&stats)?);

    Ok(())
}
