use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use multipart_demux::transport;
use multipart_demux::{Constraints, Demuxer};
use std::ops::ControlFlow;

// Pulls frames off an MJPEG camera, e.g.
// `cargo run --example hyper_client_example -- http://127.0.0.1:7663/video.mjpg 100`
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut args = std::env::args().skip(1);
    let url = args
        .next()
        .unwrap_or_else(|| "http://127.0.0.1:7663/video.mjpg".to_owned());
    let max_frames: usize = args.next().map(|n| n.parse()).transpose()?.unwrap_or(usize::MAX);

    let client = Client::builder(TokioExecutor::new()).build_http::<Empty<Bytes>>();
    let res = client.get(url.parse()?).await?;

    println!("Response: {}", res.status());

    let (parts, body) = res.into_parts();

    // Refuses non-multipart responses and boundary-less content types.
    // Cameras usually open the body with the delimiter and no leading CRLF.
    let constraints = Constraints::new().skip_opening_delimiter(true);
    let mut demuxer = Demuxer::from_headers_with_constraints(&parts.headers, constraints)?;

    let mut frames = 0;
    let outcome = transport::demux_stream(body.into_data_stream(), &mut demuxer, |part| {
        frames += 1;
        println!("Frame #{}: {} bytes of {}", part.index(), part.len(), part.content_type());

        if frames < max_frames {
            ControlFlow::Continue(())
        } else {
            ControlFlow::Break(())
        }
    })
    .await?;

    println!("{:?} after {} frames: {:?}", outcome, frames, demuxer.stats());

    Ok(())
}
