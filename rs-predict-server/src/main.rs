use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{get, post, web, App, HttpResponse, HttpServer, Responder};
use clap::Parser;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use rs_predict_core::io::read_corpus;
use rs_predict_core::{MarkovModel, DEFAULT_MAX_RESULTS, DEFAULT_ORDER};

/// Corpus the model is trained on at startup when no `--corpus` is given.
/// Trained as a single text, so n-grams run across line breaks.
const INITIAL_CORPUS: &str = "
hello how are you today
hope you are doing well
thank you for your message
i will get back to you soon
let me know if you need anything
have a great day ahead
it was nice meeting you
please let me know your thoughts
can we schedule a meeting next week
i am interested in this project
looking forward to hearing from you
the weather is beautiful today
what are your plans for the weekend
i would love to help with that
let us discuss this further
could you please send me the files
";

/// Command line configuration of the server.
#[derive(Parser, Debug)]
#[command(version, about = "Next-word prediction JSON API")]
struct Args {
	/// Address to bind
	#[arg(long, default_value = "127.0.0.1")]
	host: String,

	/// Port to bind
	#[arg(short, long, default_value_t = 5000)]
	port: u16,

	/// Initial n-gram order (>= 2)
	#[arg(short = 'n', long, default_value_t = DEFAULT_ORDER)]
	order: usize,

	/// Seed corpus file (one sentence per line), replaces the built-in corpus
	#[arg(long)]
	corpus: Option<PathBuf>,

	/// Maximum occurrences kept per context (unbounded if absent)
	#[arg(long)]
	max_occurrences: Option<usize>,
}

/// Body of `/api/predict`
#[derive(Deserialize)]
struct PredictRequest {
	#[serde(default)]
	text: Option<String>,
	max_results: Option<usize>,
}

/// Body of `/api/train`
#[derive(Deserialize)]
struct TrainRequest {
	#[serde(default)]
	text: Option<String>,
}

/// Body of `/api/settings`
#[derive(Deserialize)]
struct SettingsRequest {
	#[serde(default = "default_order")]
	n: usize,
}

fn default_order() -> usize {
	DEFAULT_ORDER
}

#[derive(Serialize)]
struct PredictResponse {
	predictions: Vec<String>,
}

#[derive(Serialize)]
struct MessageResponse {
	status: &'static str,
	message: String,
}

impl MessageResponse {
	fn success(message: &str) -> Self {
		Self { status: "success", message: message.to_owned() }
	}

	fn error(message: &str) -> Self {
		Self { status: "error", message: message.to_owned() }
	}
}

#[derive(Serialize)]
struct SettingsResponse {
	status: &'static str,
	n: usize,
}

#[derive(Serialize)]
struct StatusResponse {
	n: usize,
	patterns: usize,
	vocab_size: usize,
}

/// State shared by every worker. The `Mutex` serializes all model access.
struct SharedData {
	model: MarkovModel,
}

/// HTTP POST endpoint `/api/predict`
///
/// Returns up to `max_results` (default 5) next words for `text`.
#[post("/api/predict")]
async fn post_predict(data: web::Data<Mutex<SharedData>>, body: web::Json<PredictRequest>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let text = body.text.as_deref().unwrap_or_default();
	let max_results = body.max_results.unwrap_or(DEFAULT_MAX_RESULTS);
	let predictions = shared_data.model.predict(text, max_results);
	HttpResponse::Ok().json(PredictResponse { predictions })
}

/// HTTP POST endpoint `/api/train`
///
/// Trains the model on `text`. An empty text is rejected.
#[post("/api/train")]
async fn post_train(data: web::Data<Mutex<SharedData>>, body: web::Json<TrainRequest>) -> impl Responder {
	let text = body.into_inner().text.unwrap_or_default();
	if text.is_empty() {
		return HttpResponse::BadRequest().json(MessageResponse::error("No text provided"));
	}

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let added = shared_data.model.train(&text);
	info!("Trained on {} bytes of text, {} n-grams added", text.len(), added);
	HttpResponse::Ok().json(MessageResponse::success("Model trained successfully"))
}

/// HTTP POST endpoint `/api/settings`
///
/// Changes the model order. Existing chains are kept.
#[post("/api/settings")]
async fn post_settings(data: web::Data<Mutex<SharedData>>, body: web::Json<SettingsRequest>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	match shared_data.model.set_order(body.n) {
		Ok(()) => {
			info!("Order set to {}", body.n);
			HttpResponse::Ok().json(SettingsResponse { status: "success", n: shared_data.model.order() })
		}
		Err(e) => {
			warn!("Rejected settings: {e}");
			HttpResponse::BadRequest().json(MessageResponse::error(&e.to_string()))
		}
	}
}

/// HTTP POST endpoint `/api/clear`
#[post("/api/clear")]
async fn post_clear(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	shared_data.model.clear();
	info!("Dictionary cleared");
	HttpResponse::Ok().json(MessageResponse::success("Dictionary cleared"))
}

/// HTTP GET endpoint `/api/status`
#[get("/api/status")]
async fn get_status(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let status = shared_data.model.status();
	HttpResponse::Ok().json(StatusResponse {
		n: status.order,
		patterns: status.pattern_count,
		vocab_size: status.vocabulary_size,
	})
}

/// Registers every API endpoint.
fn routes(cfg: &mut web::ServiceConfig) {
	cfg.service(post_predict)
		.service(post_train)
		.service(post_settings)
		.service(post_clear)
		.service(get_status);
}

/// Builds the model from the command line and trains it on the seed corpus.
///
/// # Errors
/// Returns `InvalidInput` for a bad order or cap, or the I/O error of the
/// corpus file.
fn build_model(args: &Args) -> io::Result<MarkovModel> {
	let invalid = |e| io::Error::new(io::ErrorKind::InvalidInput, e);

	let mut model = MarkovModel::new(args.order).map_err(invalid)?;
	if let Some(cap) = args.max_occurrences {
		model = model.with_max_occurrences(cap).map_err(invalid)?;
	}

	let added = match &args.corpus {
		Some(path) => {
			info!("Loading seed corpus from {}", path.display());
			model.train_lines(read_corpus(path)?)
		}
		None => model.train(INITIAL_CORPUS),
	};

	let status = model.status();
	info!(
		"Model ready: order {}, {} n-grams, {} patterns, {} words",
		status.order, added, status.pattern_count, status.vocabulary_size
	);
	Ok(model)
}

/// Main entry point for the server.
///
/// Builds and seeds the model, wraps it in a `Mutex` and starts an
/// Actix-web HTTP server exposing the `/api` endpoints.
#[actix_web::main]
async fn main() -> io::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let args = Args::parse();
	let shared_data = SharedData {
		model: build_model(&args)?,
	};
	let shared_model = web::Data::new(Mutex::new(shared_data));

	info!("Starting PredictFlow API on {}:{}", args.host, args.port);
	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.wrap(Logger::default())
			.app_data(shared_model.clone())
			.configure(routes)
	})
		.bind((args.host.as_str(), args.port))?
		.run()
		.await
}

#[cfg(test)]
mod tests {
	use super::*;
	use actix_web::http::StatusCode;
	use actix_web::test;
	use serde_json::{json, Value};

	fn shared(model: MarkovModel) -> web::Data<Mutex<SharedData>> {
		web::Data::new(Mutex::new(SharedData { model }))
	}

	fn seeded() -> web::Data<Mutex<SharedData>> {
		let args = Args::parse_from(["rs-predict-server"]);
		shared(build_model(&args).unwrap())
	}

	#[actix_web::test]
	async fn predict_uses_seed_corpus() {
		let app = test::init_service(App::new().app_data(seeded()).configure(routes)).await;

		let req = test::TestRequest::post()
			.uri("/api/predict")
			.set_json(json!({ "text": "Thank" }))
			.to_request();
		let body: Value = test::call_and_read_body_json(&app, req).await;
		assert_eq!(body, json!({ "predictions": ["you"] }));
	}

	#[actix_web::test]
	async fn seed_corpus_spans_line_breaks() {
		let app = test::init_service(App::new().app_data(seeded()).configure(routes)).await;

		for (text, expected) in [("today", json!(["hope", "what"])), ("well", json!(["thank"]))] {
			let req = test::TestRequest::post()
				.uri("/api/predict")
				.set_json(json!({ "text": text }))
				.to_request();
			let body: Value = test::call_and_read_body_json(&app, req).await;
			assert_eq!(body["predictions"], expected);
		}

		let req = test::TestRequest::get().uri("/api/status").to_request();
		let body: Value = test::call_and_read_body_json(&app, req).await;
		assert_eq!(body, json!({ "n": 2, "patterns": 66, "vocab_size": 66 }));
	}

	#[actix_web::test]
	async fn predict_respects_max_results() {
		let mut model = MarkovModel::default();
		model.train_lines(["a b", "a c", "a c", "a d"]);
		let app = test::init_service(App::new().app_data(shared(model)).configure(routes)).await;

		let req = test::TestRequest::post()
			.uri("/api/predict")
			.set_json(json!({ "text": "a", "max_results": 2 }))
			.to_request();
		let body: Value = test::call_and_read_body_json(&app, req).await;
		assert_eq!(body["predictions"], json!(["c", "b"]));

		for payload in [json!({}), json!({ "text": null })] {
			let req = test::TestRequest::post().uri("/api/predict").set_json(payload).to_request();
			let body: Value = test::call_and_read_body_json(&app, req).await;
			assert_eq!(body["predictions"], json!([]));
		}
	}

	#[actix_web::test]
	async fn train_then_predict() {
		let app = test::init_service(App::new().app_data(shared(MarkovModel::default())).configure(routes)).await;

		let req = test::TestRequest::post()
			.uri("/api/train")
			.set_json(json!({ "text": "rust is fast" }))
			.to_request();
		let body: Value = test::call_and_read_body_json(&app, req).await;
		assert_eq!(body["status"], "success");

		let req = test::TestRequest::post()
			.uri("/api/predict")
			.set_json(json!({ "text": "rust is" }))
			.to_request();
		let body: Value = test::call_and_read_body_json(&app, req).await;
		assert_eq!(body["predictions"], json!(["fast"]));
	}

	#[actix_web::test]
	async fn train_without_text_is_rejected() {
		let app = test::init_service(App::new().app_data(shared(MarkovModel::default())).configure(routes)).await;

		for payload in [json!({}), json!({ "text": "" }), json!({ "text": null })] {
			let req = test::TestRequest::post().uri("/api/train").set_json(payload).to_request();
			let resp = test::call_service(&app, req).await;
			assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
			let body: Value = test::read_body_json(resp).await;
			assert_eq!(body, json!({ "status": "error", "message": "No text provided" }));
		}
	}

	#[actix_web::test]
	async fn settings_change_order() {
		let data = shared(MarkovModel::default());
		let app = test::init_service(App::new().app_data(data.clone()).configure(routes)).await;

		let req = test::TestRequest::post()
			.uri("/api/settings")
			.set_json(json!({ "n": 3 }))
			.to_request();
		let body: Value = test::call_and_read_body_json(&app, req).await;
		assert_eq!(body, json!({ "status": "success", "n": 3 }));
		assert_eq!(data.lock().unwrap().model.order(), 3);
	}

	#[actix_web::test]
	async fn settings_reject_invalid_order() {
		let data = shared(MarkovModel::default());
		let app = test::init_service(App::new().app_data(data.clone()).configure(routes)).await;

		for payload in [json!({ "n": 1 }), json!({ "n": "three" }), json!({ "n": -2 })] {
			let req = test::TestRequest::post().uri("/api/settings").set_json(payload).to_request();
			let resp = test::call_service(&app, req).await;
			assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
		}
		assert_eq!(data.lock().unwrap().model.order(), DEFAULT_ORDER);
	}

	#[actix_web::test]
	async fn clear_and_status() {
		let app = test::init_service(App::new().app_data(seeded()).configure(routes)).await;

		let req = test::TestRequest::get().uri("/api/status").to_request();
		let body: Value = test::call_and_read_body_json(&app, req).await;
		assert_eq!(body["n"], 2);
		assert!(body["patterns"].as_u64().unwrap() > 0);
		assert!(body["vocab_size"].as_u64().unwrap() > 0);

		let req = test::TestRequest::post().uri("/api/clear").to_request();
		let body: Value = test::call_and_read_body_json(&app, req).await;
		assert_eq!(body, json!({ "status": "success", "message": "Dictionary cleared" }));

		let req = test::TestRequest::get().uri("/api/status").to_request();
		let body: Value = test::call_and_read_body_json(&app, req).await;
		assert_eq!(body, json!({ "n": 2, "patterns": 0, "vocab_size": 0 }));
	}

	#[actix_web::test]
	async fn build_model_rejects_bad_settings() {
		let args = Args::parse_from(["rs-predict-server", "-n", "1"]);
		assert_eq!(build_model(&args).unwrap_err().kind(), io::ErrorKind::InvalidInput);

		let args = Args::parse_from(["rs-predict-server", "--max-occurrences", "0"]);
		assert_eq!(build_model(&args).unwrap_err().kind(), io::ErrorKind::InvalidInput);

		let args = Args::parse_from(["rs-predict-server", "--corpus", "/nonexistent/corpus.txt"]);
		assert_eq!(build_model(&args).unwrap_err().kind(), io::ErrorKind::NotFound);
	}
}
