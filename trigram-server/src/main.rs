use std::io::Cursor;

use actix_cors::Cors;
use actix_web::{get, post, web, App, HttpResponse, HttpServer, Responder};
use clap::Parser;
use log::{error, info};

use trigram_core::config::{DEFAULT_GRAM_SIZE, DEFAULT_MAX_WORDS, DEFAULT_QUEUE_SIZE, DEFAULT_WORKERS};
use trigram_core::{Engine, EngineConfig, NormalizationRule};

/// Learns word sequences from posted text and generates new text from them.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
	/// Address to bind
	#[arg(long, default_value = "127.0.0.1")]
	bind: String,

	/// Port to listen on
	#[arg(short, long, default_value_t = 8080)]
	port: u16,

	/// Tokens per gram
	#[arg(long, default_value_t = DEFAULT_GRAM_SIZE)]
	gram_size: usize,

	/// Words per generated text, 0 for no limit
	#[arg(long, default_value_t = DEFAULT_MAX_WORDS)]
	max_words: usize,

	/// Drop line breaks and punctuation from learned text
	#[arg(long)]
	strip_punctuation: bool,

	/// Learn pool size
	#[arg(long, default_value_t = DEFAULT_WORKERS)]
	learn_workers: usize,

	/// Generate pool size
	#[arg(long, default_value_t = DEFAULT_WORKERS)]
	generate_workers: usize,

	/// Pending tasks per pool before callers block
	#[arg(long, default_value_t = DEFAULT_QUEUE_SIZE)]
	queue_size: usize,
}

impl Args {
	fn engine_config(&self) -> EngineConfig {
		EngineConfig {
			gram_size: self.gram_size,
			max_words: self.max_words,
			strip_punctuation: self.strip_punctuation,
			normalization_rules: NormalizationRule::defaults(),
			learn_workers: self.learn_workers,
			generate_workers: self.generate_workers,
			queue_size: self.queue_size,
		}
	}
}

/// HTTP POST endpoint `/v1/learn`
///
/// Learns the request body and answers once every gram of it is in the
/// store.
#[post("/v1/learn")]
async fn post_learn(engine: web::Data<Engine>, body: web::Bytes) -> impl Responder {
	let result = web::block(move || engine.learn(Cursor::new(body))).await;
	match result {
		Ok(Ok(_)) => HttpResponse::Ok().finish(),
		Ok(Err(e)) => {
			error!("Learn request failed: {e}");
			HttpResponse::ServiceUnavailable().body(e.to_string())
		}
		Err(e) => {
			error!("Learn request failed: {e}");
			HttpResponse::InternalServerError().finish()
		}
	}
}

/// HTTP GET endpoint `/v1/generate`
///
/// Returns one generated text as the response body. The body is empty when
/// nothing was learned yet.
#[get("/v1/generate")]
async fn get_generated(engine: web::Data<Engine>) -> impl Responder {
	let result = web::block(move || engine.generate()).await;
	match result {
		Ok(Ok(text)) => HttpResponse::Ok().body(text),
		Ok(Err(e)) => {
			error!("Generate request failed: {e}");
			HttpResponse::ServiceUnavailable().body(e.to_string())
		}
		Err(e) => {
			error!("Generate request failed: {e}");
			HttpResponse::InternalServerError().finish()
		}
	}
}

/// HTTP GET endpoint `/v1/stats`
///
/// Returns the number of distinct grams and the total frequency as JSON.
#[get("/v1/stats")]
async fn get_stats(engine: web::Data<Engine>) -> impl Responder {
	HttpResponse::Ok().json(engine.store().stats())
}

/// Main entry point for the server.
///
/// Starts the learn and generate pools over one shared store, then serves
/// them over HTTP until interrupted.
///
/// # Notes
/// - Invalid flags stop the process before any pool starts.
/// - HTTP workers are capped to the number of CPUs; learn and generate
///   requests wait on the engine pools in actix's blocking thread pool.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();
	let args = Args::parse();

	let config = args.engine_config();
	let engine = match Engine::start(&config) {
		Ok(engine) => web::Data::new(engine),
		Err(e) => {
			error!("Cannot start engine: {e}");
			return Err(std::io::Error::other(e.to_string()));
		}
	};

	info!("Listening on {}:{}", args.bind, args.port);
	let shared_engine = engine.clone();
	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_engine.clone())
			.service(post_learn)
			.service(get_generated)
			.service(get_stats)
	})
		.workers(num_cpus::get().max(1))
		.bind((args.bind.as_str(), args.port))?
		.run()
		.await?;

	engine.stop();
	Ok(())
}
