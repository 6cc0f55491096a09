use std::ops::ControlFlow;
use tokio::io::AsyncRead;
// Import multipart-demux types.
use multipart_demux::transport::{self, Outcome};
use multipart_demux::{Constraints, Demuxer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Generate an `AsyncRead` and the content type from somewhere e.g. a recorded camera response.
    let (reader, content_type) = get_async_reader_from_somewhere().await;

    // Create a `Demuxer` from the outer `Content-Type`, which carries the boundary.
    // The recorded body opens with `--frame` and no leading CRLF.
    let constraints = Constraints::new().skip_opening_delimiter(true);
    let mut demuxer = Demuxer::with_constraints(content_type, constraints)?;

    // Every image found is handed to the callback, return `Break` to stop early.
    let outcome = transport::demux_reader(reader, &mut demuxer, |part| {
        println!(
            "Frame #{}: {} bytes of {}",
            part.index(),
            part.len(),
            part.content_type()
        );
        ControlFlow::Continue(())
    })
    .await?;

    if outcome == Outcome::Ended {
        println!("Stream ended: {:?}", demuxer.stats());
    }

    Ok(())
}

// Generate an `AsyncRead` and the content type from somewhere e.g. a recorded camera response.
async fn get_async_reader_from_somewhere() -> (impl AsyncRead, &'static str) {
    let data: &'static [u8] = b"--frame\r\nContent-Type: image/jpeg\r\nContent-Length: 4\r\n\r\n\xff\xd8\xff\xd9\r\n--frame\r\nContent-Type: image/png\r\n\r\n\x89PNG\r\n--frame\r\n";

    (data, "multipart/x-mixed-replace; boundary=frame")
}
