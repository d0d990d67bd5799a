use std::io;
use std::thread::JoinHandle;
use std::time::Instant;

use crate::capture::domain::frame_slot::{FrameReceiver, FrameStats};
use crate::pipeline::detection_invoker::DetectionInvoker;
use crate::pipeline::pipeline_logger::PipelineLogger;

/// Starts the thread that consumes frames from the slot.
///
/// Each frame's lease is held until detection for it has completed, so the
/// capture side drops every frame offered in the meantime. The thread exits
/// when the capture side closes, prints the logger summary and returns the
/// final slot counters.
pub fn spawn_frame_worker(
    frames: FrameReceiver,
    mut invoker: DetectionInvoker,
    mut logger: Box<dyn PipelineLogger>,
) -> io::Result<JoinHandle<FrameStats>> {
    std::thread::Builder::new()
        .name("frame worker".into())
        .spawn(move || {
            while let Some(frame) = frames.recv() {
                let start = Instant::now();
                let submitted = invoker.process(&frame);
                logger.timing("detect", start.elapsed().as_secs_f64() * 1000.0);
                if !submitted {
                    logger.metric("failed_frames", 1.0);
                }
                let index = frame.index();
                drop(frame);
                logger.frame(index, frames.stats());
            }

            let stats = frames.stats();
            logger.info(&format!(
                "Frame source ended: {} processed, {} dropped",
                stats.delivered, stats.dropped
            ));
            logger.summary();
            stats
        })
}
