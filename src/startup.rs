use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::http::Method;
use actix_web::middleware::DefaultHeaders;
use actix_web::{web, App, HttpServer};
use tracing_actix_web::TracingLogger;

use crate::configuration::Settings;
use crate::email_client::EmailClient;
use crate::rate_limit::KeyedRateLimiter;
use crate::routes::{contact_preflight, health_check, method_not_allowed, send_contact_email};

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let email_client = configuration.email_client.client();
        let rate_limiter = configuration.rate_limit.limiter();

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();
        let server = run(listener, email_client, rate_limiter)?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(
    listener: TcpListener,
    email_client: EmailClient,
    rate_limiter: KeyedRateLimiter,
) -> Result<Server, std::io::Error> {
    // using web::Data to wrap shared state in a smart pointer (Arc), as App
    // requires app_data to be clonable across worker threads
    let email_client = web::Data::new(email_client);
    let rate_limiter = web::Data::new(rate_limiter);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            // The site front end calls this endpoint cross-origin; every
            // response, preflight included, carries the permissive headers.
            .wrap(
                DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", "*"))
                    .add((
                        "Access-Control-Allow-Headers",
                        "authorization, x-client-info, apikey, content-type",
                    ))
                    .add(("Access-Control-Max-Age", "86400")),
            )
            .route("/health_check", web::get().to(health_check))
            .service(
                web::resource("/api/contact")
                    .route(web::post().to(send_contact_email))
                    .route(web::method(Method::OPTIONS).to(contact_preflight))
                    .route(web::route().to(method_not_allowed)),
            )
            .app_data(email_client.clone())
            .app_data(rate_limiter.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
