//! Serves a handful of routes on 127.0.0.1:8080.
//!
//! ```sh
//! curl -i localhost:8080/user/alice/add
//! curl -i -X POST localhost:8080/post/
//! curl -i -X POST localhost:8080/admin
//! ```
//!
//! `--config <file>` names a TOML config file, see `ServerConfig`.

use clap::Parser;
use http::StatusCode;
use micro_route::{handler_fn, middleware_fn, Context, HandlerResult, MiddlewareRegistry, Router};
use micro_route_serve::{Server, ServerConfig};
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "microserve", about = "Serves the micro-route demo routes")]
struct Args {
    /// TOML server config, defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn get_handler(ctx: &mut Context) -> HandlerResult {
    ctx.set_status(StatusCode::CREATED);
    ctx.json(&json!({ "hello": "world" }))?;
    Ok(())
}

fn post_handler(ctx: &mut Context) -> HandlerResult {
    ctx.set_status(StatusCode::ACCEPTED);
    ctx.raw_json(r#"{"hello": "world"}"#);
    Ok(())
}

fn post_trail_handler(ctx: &mut Context) -> HandlerResult {
    ctx.json(&json!({ "post": "trail" }))?;
    Ok(())
}

fn var_handler(ctx: &mut Context) -> HandlerResult {
    let name = ctx.path_variable("name")?.to_owned();
    ctx.json(&json!({ "name": name }))?;
    Ok(())
}

fn var_get_handler(ctx: &mut Context) -> HandlerResult {
    let name = ctx.path_variable("name")?.to_owned();
    ctx.json(&json!({ "name": name, "method": "add" }))?;
    Ok(())
}

fn maintenance(ctx: &mut Context) {
    ctx.text("admin is under maintenance");
    ctx.abort(StatusCode::SERVICE_UNAVAILABLE);
}

fn router() -> Result<Router, micro_route::RouteError> {
    let mut registry = MiddlewareRegistry::new();
    registry.register("maintenance", middleware_fn(maintenance));

    let mut router = Router::new();
    router
        .get("/", handler_fn(get_handler), vec![])
        .get("/get", handler_fn(get_handler), vec![])
        .post("/post", handler_fn(post_handler), vec![])
        .post("/post/", handler_fn(post_trail_handler), vec![])
        .get("/user/:name", handler_fn(var_handler), vec![])
        .get("/user/:name/add", handler_fn(var_get_handler), vec![]);
    router.add_named_route(
        http::Method::POST,
        "/admin",
        handler_fn(get_handler),
        &["maintenance"],
        &registry,
    )?;
    Ok(router)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let config = match args.config {
        Some(path) => match ServerConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("can't load config {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => ServerConfig::default(),
    };

    let router = match router() {
        Ok(router) => router,
        Err(e) => {
            eprintln!("invalid routes: {e}");
            return ExitCode::FAILURE;
        }
    };

    let server = match Server::builder().router(router).config(config).build() {
        Ok(server) => server,
        Err(e) => {
            eprintln!("can't build server: {e}");
            return ExitCode::FAILURE;
        }
    };

    match server.start().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("server stopped: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn args_are_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn config_flag_is_a_path() {
        let args = Args::try_parse_from(["microserve", "--config", "server.toml"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("server.toml")));

        let args = Args::try_parse_from(["microserve"]).unwrap();
        assert_eq!(args.config, None);

        assert!(Args::try_parse_from(["microserve", "server.toml"]).is_err());
    }

    #[test]
    fn demo_routes_register() {
        let router = router().unwrap();
        assert!(router.match_route(&http::Method::GET, "/user/alice/add").is_success());
        assert!(matches!(
            router.match_route(&http::Method::POST, "/admin").outcome(),
            micro_route::MatchOutcome::Aborted(StatusCode::SERVICE_UNAVAILABLE)
        ));
    }
}
