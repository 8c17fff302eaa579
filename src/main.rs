// SPDX-License-Identifier: MPL-2.0

use pawsfeed::backend::{BackendClient, PostId, RemoteStore};
use pawsfeed::cache::{BackgroundImage, CacheDb, ImageCache, KeyValueStore, MemoryStore};
use pawsfeed::clock::SystemClock;
use pawsfeed::config::APP_NAME;
use pawsfeed::likes::{LikeSync, SyncOutcome};
use pawsfeed::notice::NoticeBoard;
use pawsfeed::runtime;
use pawsfeed::settings::Settings;
use pawsfeed::unsplash::UnsplashClient;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt};

const USAGE: &str = "usage: pawsfeed [background [--refresh] | like <post-id>]";

fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let settings = Settings::load();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        [] | ["background"] => show_background(&settings, false),
        ["background", "--refresh"] => show_background(&settings, true),
        ["like", post_id] => toggle_like(&settings, post_id),
        _ => {
            eprintln!("{USAGE}");
            ExitCode::FAILURE
        }
    }
}

fn show_background(settings: &Settings, refresh: bool) -> ExitCode {
    let store: Arc<dyn KeyValueStore> = match CacheDb::open() {
        Ok(db) => Arc::new(db),
        Err(e) => {
            tracing::warn!(error = %e, "cache unavailable, using memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let image = match UnsplashClient::from_settings(settings) {
        Ok(provider) => {
            let cache = ImageCache::new(store, Arc::new(provider), Arc::new(SystemClock))
                .with_query(&settings.image_query, &settings.image_orientation);
            if refresh {
                runtime::block_on(cache.refresh())
            } else {
                runtime::block_on(cache.load())
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "image provider unavailable");
            BackgroundImage::fallback()
        }
    };

    println!("{}", image.url);
    if let Some(credit) = &image.attribution {
        println!("{} ({})", credit.credit_line(), credit.source_page_url);
    }
    ExitCode::SUCCESS
}

fn toggle_like(settings: &Settings, post_id: &str) -> ExitCode {
    let remote: Arc<dyn RemoteStore> = match BackendClient::from_settings(settings) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            eprintln!("{APP_NAME}: {e}");
            return ExitCode::FAILURE;
        }
    };
    let clock = Arc::new(SystemClock);
    let notices = Arc::new(NoticeBoard::new(clock.clone()));
    let post = PostId::new(post_id);

    let (outcome, state) = runtime::block_on(async {
        let sync = LikeSync::open(remote, clock, post)
            .await
            .with_notices(notices.clone());
        let outcome = sync.toggle().await;
        (outcome, sync.state())
    });

    for notice in notices.active() {
        eprintln!("{}", notice.message);
    }

    match outcome {
        Ok(SyncOutcome::Applied) => {
            let verb = if state.is_liked { "liked" } else { "unliked" };
            let label = state.label().unwrap_or_else(|| "no likes".to_string());
            println!("{verb} {} ({label})", state.post_id);
            ExitCode::SUCCESS
        }
        Ok(SyncOutcome::Unauthenticated) => {
            eprintln!("{APP_NAME}: sign in first (set PAWS_ACCESS_TOKEN)");
            ExitCode::FAILURE
        }
        Ok(SyncOutcome::InFlight | SyncOutcome::AlreadyLiked) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
