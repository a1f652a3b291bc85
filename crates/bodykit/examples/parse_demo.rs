use bodykit::{ParsedBody, parse_request};
use bytes::Bytes;
use http::{HeaderMap, HeaderValue, header};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::TRACE).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let boundary = "demo-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"caption\"\r\n\r\n\
         a rusty crab\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"photo\"; filename=\"ferris.png\"\r\n\
         Content-Type: image/png\r\n\r\n\
         pretend this is png data\r\n\
         --{boundary}--\r\n"
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&format!("multipart/form-data; boundary={boundary}")).unwrap(),
    );

    match parse_request(&headers, &Bytes::from(body)) {
        Ok(ParsedBody::Form(form)) => {
            for (name, values) in form.arguments.iter() {
                info!(name, ?values, "field");
            }
            for (name, files) in form.files.iter() {
                for file in files {
                    info!(
                        name,
                        filename = %file.filename,
                        content_type = %file.content_type,
                        len = file.body.len(),
                        "file"
                    );
                }
            }
        }
        Ok(ParsedBody::Json(value)) => info!(%value, "json body"),
        Err(e) => eprintln!("parse failed: {e}"),
    }
}
