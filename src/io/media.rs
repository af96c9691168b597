// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Streaming media loading for video rectangles.
//!
//! Media files are decoded on a background thread and handed to the UI
//! thread frame by frame over a channel. A stream becomes ready once its
//! first frame has arrived; until then it can still be played and paused,
//! there is simply nothing to show.

use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

/// Frame delays below this are clamped (many GIFs declare a zero delay).
const MIN_FRAME_DELAY: Duration = Duration::from_millis(20);

/// How long a still image is shown before the stream counts as ended.
const STILL_FRAME_DELAY: Duration = Duration::from_secs(1);

/// Frames a decoder may run ahead of playback before it blocks.
pub const FRAME_BUFFER: usize = 8;

/// Clips whose decoded pixels fit in this many bytes are kept for replay.
const REPLAY_BUDGET_BYTES: usize = 64 * 1024 * 1024;

type Decoder = fn(&Path, &SyncSender<LoaderMessage>) -> Result<()>;

static NEXT_STREAM_ID: AtomicU64 = AtomicU64::new(1);

/// A decoded RGBA8 video frame.
#[derive(Clone)]
pub struct VideoFrame {
    /// Stream the frame belongs to (stable texture cache key)
    pub stream_id: u64,
    /// Position of the frame in its stream
    pub index: usize,
    pub width: u32,
    pub height: u32,
    /// Unmultiplied RGBA8 pixels, row major
    pub pixels: Arc<Vec<u8>>,
    /// How long the frame stays on screen
    pub delay: Duration,
}

impl fmt::Debug for VideoFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoFrame")
            .field("stream_id", &self.stream_id)
            .field("index", &self.index)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("delay", &self.delay)
            .finish()
    }
}

/// Messages sent from a decoder thread to its stream.
#[derive(Debug)]
pub enum LoaderMessage {
    Frame(VideoFrame),
    Finished,
    Failed(String),
}

/// Playback interface of an external media resource.
pub trait MediaStream: fmt::Debug {
    /// One-shot readiness notification: returns `true` exactly once, the
    /// first time it is called after the first frame has been decoded.
    fn take_ready(&mut self) -> bool;

    fn is_paused(&self) -> bool;

    fn is_ended(&self) -> bool;

    /// The resource is still being decoded.
    fn is_decoding(&self) -> bool;

    /// Start or resume playback. Restarts from the first frame if ended.
    fn play(&mut self);

    fn pause(&mut self);

    /// Advance the playback clock.
    fn advance(&mut self, dt: Duration);

    /// Frame to display at the current playback position.
    fn current_frame(&self) -> Option<&VideoFrame>;
}

/// A stream of frames fed by a decoder thread.
///
/// Frames are pulled from the decoder one at a time as playback reaches
/// them. The channel holds at most [`FRAME_BUFFER`] frames, so a decoder
/// blocks once it is that far ahead. Short clips are kept in memory for
/// replay; longer ones are decoded again from their source on restart.
#[derive(Debug)]
pub struct FrameSequence {
    id: u64,
    source: String,
    loader: Option<Receiver<LoaderMessage>>,
    reopen: Option<(PathBuf, Decoder)>,
    current: Option<VideoFrame>,
    /// Frames received during the current decoding pass
    decoded: usize,
    /// Every frame of the first pass, dropped once over `replay_budget`
    replay: Option<Vec<VideoFrame>>,
    replay_bytes: usize,
    replay_budget: usize,
    /// Position in `replay` while playing back from memory
    replaying: Option<usize>,
    decoding_finished: bool,
    ready_taken: bool,
    elapsed: Duration,
    paused: bool,
    ended: bool,
}

impl FrameSequence {
    fn new(
        source: &str,
        loader: Option<Receiver<LoaderMessage>>,
        reopen: Option<(PathBuf, Decoder)>,
    ) -> Self {
        Self {
            id: NEXT_STREAM_ID.fetch_add(1, Ordering::Relaxed),
            source: source.to_string(),
            decoding_finished: loader.is_none(),
            loader,
            reopen,
            current: None,
            decoded: 0,
            replay: Some(Vec::new()),
            replay_bytes: 0,
            replay_budget: REPLAY_BUDGET_BYTES,
            replaying: None,
            ready_taken: false,
            elapsed: Duration::ZERO,
            paused: true,
            ended: false,
        }
    }

    /// A stream whose resource could not be requested. It never becomes
    /// ready but still answers playback queries.
    pub fn unavailable(source: &str) -> Self {
        Self::new(source, None, None)
    }

    /// Create a stream plus the sender a decoder uses to feed it.
    #[cfg(test)]
    pub fn with_channel(source: &str) -> (Self, SyncSender<LoaderMessage>) {
        let (sender, receiver) = sync_channel(FRAME_BUFFER);
        (Self::new(source, Some(receiver), None), sender)
    }

    /// Start decoding `path` on a background thread.
    pub fn open(source: &str, path: PathBuf, decoder: Decoder) -> Self {
        let loader = spawn_loader(path.clone(), decoder);
        Self::new(source, Some(loader), Some((path, decoder)))
    }

    #[cfg(test)]
    fn with_replay_budget(mut self, bytes: usize) -> Self {
        self.replay_budget = bytes;
        self
    }

    /// Take one message from the decoder, if one is waiting.
    fn receive(&mut self) -> Option<VideoFrame> {
        let receiver = self.loader.as_ref()?;
        match receiver.try_recv() {
            Ok(LoaderMessage::Frame(mut frame)) => {
                frame.stream_id = self.id;
                frame.index = self.decoded;
                frame.delay = frame.delay.max(MIN_FRAME_DELAY);
                self.decoded += 1;
                self.remember(&frame);
                Some(frame)
            }
            Ok(LoaderMessage::Finished) => {
                log::debug!("Decoded {} frames from {}", self.decoded, self.source);
                self.finish_decoding();
                None
            }
            Ok(LoaderMessage::Failed(e)) => {
                log::error!("Failed to load media {}: {}", self.source, e);
                self.finish_decoding();
                None
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.finish_decoding();
                None
            }
        }
    }

    fn remember(&mut self, frame: &VideoFrame) {
        let Some(replay) = self.replay.as_mut() else {
            return;
        };
        let bytes = frame.pixels.len();
        if self.replay_bytes + bytes <= self.replay_budget {
            replay.push(frame.clone());
            self.replay_bytes += bytes;
        } else {
            log::debug!("{} is too long to keep, restarts will decode it again", self.source);
            self.replay = None;
            self.replay_bytes = 0;
        }
    }

    /// The frame after the current one, from memory or from the decoder.
    fn next_frame(&mut self) -> Option<VideoFrame> {
        match self.replaying {
            Some(position) => {
                let frame = self.replay.as_ref()?.get(position + 1)?.clone();
                self.replaying = Some(position + 1);
                Some(frame)
            }
            None => self.receive(),
        }
    }

    /// No frame will follow the current one.
    fn exhausted(&self) -> bool {
        self.replaying.is_some() || self.decoding_finished
    }

    fn finish_decoding(&mut self) {
        self.loader = None;
        self.decoding_finished = true;
    }

    fn restart(&mut self) {
        self.elapsed = Duration::ZERO;

        let first = self
            .replay
            .as_ref()
            .filter(|_| self.decoding_finished)
            .and_then(|replay| replay.first().cloned());
        if let Some(first) = first {
            self.current = Some(first);
            self.replaying = Some(0);
            self.ended = false;
            return;
        }

        match &self.reopen {
            Some((path, decoder)) => {
                log::debug!("Decoding {} again from the start", self.source);
                self.loader = Some(spawn_loader(path.clone(), *decoder));
                self.decoding_finished = false;
                self.decoded = 0;
                self.replaying = None;
                self.current = None;
                self.ended = false;
            }
            None => log::warn!("Cannot restart {}, its frames are gone", self.source),
        }
    }
}

impl MediaStream for FrameSequence {
    fn take_ready(&mut self) -> bool {
        if self.current.is_none() {
            self.current = self.next_frame();
        }
        if self.ready_taken || self.current.is_none() {
            return false;
        }
        self.ready_taken = true;
        true
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn is_ended(&self) -> bool {
        self.ended
    }

    fn is_decoding(&self) -> bool {
        self.loader.is_some()
    }

    fn play(&mut self) {
        if self.ended {
            self.restart();
        }
        self.paused = false;
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn advance(&mut self, dt: Duration) {
        if self.paused || self.ended {
            return;
        }

        let Some(mut delay) = self.current.as_ref().map(|f| f.delay) else {
            self.current = self.next_frame();
            return;
        };

        self.elapsed += dt;
        while self.elapsed >= delay {
            match self.next_frame() {
                Some(frame) => {
                    self.elapsed -= delay;
                    delay = frame.delay;
                    self.current = Some(frame);
                }
                None if self.exhausted() => {
                    self.ended = true;
                    self.elapsed = Duration::ZERO;
                    log::debug!("Playback of {} ended", self.source);
                    break;
                }
                None => {
                    // Decoder has not caught up; hold the last frame
                    self.elapsed = delay;
                    break;
                }
            }
        }
    }

    fn current_frame(&self) -> Option<&VideoFrame> {
        self.current.as_ref()
    }
}

fn spawn_loader(path: PathBuf, decoder: Decoder) -> Receiver<LoaderMessage> {
    let (sender, receiver) = sync_channel(FRAME_BUFFER);
    std::thread::spawn(move || {
        let message = match decoder(&path, &sender) {
            Ok(()) => LoaderMessage::Finished,
            Err(e) => LoaderMessage::Failed(format!("{:#}", e)),
        };
        let _ = sender.send(message);
    });
    receiver
}

/// Request a media resource and return its stream.
///
/// Decoding starts immediately on a background thread. Resources that
/// cannot be requested produce a stream that never becomes ready.
pub fn open_stream(source: &str) -> Box<dyn MediaStream> {
    if source.starts_with("http://") || source.starts_with("https://") {
        log::warn!("Network media is not supported, {} will never load", source);
        return Box::new(FrameSequence::unavailable(source));
    }

    let path = PathBuf::from(source);
    let decoder = if is_image_file(&path) {
        decode_image_frames as Decoder
    } else {
        match video_decoder(source) {
            Some(decoder) => decoder,
            None => return Box::new(FrameSequence::unavailable(source)),
        }
    };

    log::info!("Loading media {}", source);
    Box::new(FrameSequence::open(source, path, decoder))
}

fn is_image_file(path: &Path) -> bool {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());
    matches!(
        extension.as_deref(),
        Some("gif") | Some("png") | Some("jpg") | Some("jpeg") | Some("bmp") | Some("webp")
    )
}

/// Decode an animated GIF frame by frame, or a still image as one frame.
fn decode_image_frames(path: &Path, sender: &SyncSender<LoaderMessage>) -> Result<()> {
    use image::AnimationDecoder;

    let is_gif = path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.eq_ignore_ascii_case("gif"));

    if !is_gif {
        let img = image::open(path)
            .with_context(|| format!("Failed to open image {}", path.display()))?
            .to_rgba8();
        let (width, height) = img.dimensions();
        let _ = sender.send(LoaderMessage::Frame(VideoFrame {
            stream_id: 0,
            index: 0,
            width,
            height,
            pixels: Arc::new(img.into_raw()),
            delay: STILL_FRAME_DELAY,
        }));
        return Ok(());
    }

    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let decoder = image::codecs::gif::GifDecoder::new(std::io::BufReader::new(file))?;

    for frame in decoder.into_frames() {
        let frame = frame?;
        let (numer, denom) = frame.delay().numer_denom_ms();
        let delay_ms = if denom == 0 { 0 } else { numer / denom };
        let buffer = frame.into_buffer();
        let (width, height) = buffer.dimensions();

        let message = LoaderMessage::Frame(VideoFrame {
            stream_id: 0,
            index: 0,
            width,
            height,
            pixels: Arc::new(buffer.into_raw()),
            delay: Duration::from_millis(u64::from(delay_ms)),
        });
        if sender.send(message).is_err() {
            // Stream dropped, nobody is watching anymore
            return Ok(());
        }
    }

    Ok(())
}

#[cfg(feature = "video-opencv")]
fn video_decoder(_source: &str) -> Option<Decoder> {
    Some(decode_video_frames)
}

#[cfg(not(feature = "video-opencv"))]
fn video_decoder(source: &str) -> Option<Decoder> {
    log::error!(
        "Cannot decode {}: video files need the video-opencv feature",
        source
    );
    None
}

#[cfg(feature = "video-opencv")]
fn decode_video_frames(path: &Path, sender: &SyncSender<LoaderMessage>) -> Result<()> {
    use opencv::{core::Mat, imgproc, prelude::*, videoio};

    let mut capture =
        videoio::VideoCapture::from_file(&path.to_string_lossy(), videoio::CAP_ANY)?;
    if !capture.is_opened()? {
        anyhow::bail!("OpenCV could not open {}", path.display());
    }

    let fps = capture.get(videoio::CAP_PROP_FPS)?;
    let delay = if fps > 0.0 {
        Duration::from_secs_f64(1.0 / fps)
    } else {
        MIN_FRAME_DELAY
    };

    let mut bgr = Mat::default();
    while capture.read(&mut bgr)? {
        let mut rgba = Mat::default();
        imgproc::cvt_color(&bgr, &mut rgba, imgproc::COLOR_BGR2RGBA, 0)?;

        let message = LoaderMessage::Frame(VideoFrame {
            stream_id: 0,
            index: 0,
            width: rgba.cols() as u32,
            height: rgba.rows() as u32,
            pixels: Arc::new(rgba.data_bytes()?.to_vec()),
            delay,
        });
        if sender.send(message).is_err() {
            return Ok(());
        }
    }

    Ok(())
}

#[cfg(test)]
pub(crate) fn test_frame(delay_ms: u64) -> VideoFrame {
    VideoFrame {
        stream_id: 0,
        index: 0,
        width: 2,
        height: 2,
        pixels: Arc::new(vec![255; 16]),
        delay: Duration::from_millis(delay_ms),
    }
}
