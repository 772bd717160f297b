//! Latest-wins frame slot
//!
//! A [`FrameSlot`] holds at most one [`Frame`]: the most recent one published
//! by the camera's capture worker. It is built on `tokio::sync::watch`, whose
//! internal lock is held only for the pointer swap on publish and the `Arc`
//! clone on snapshot, so neither side ever waits on the other's I/O.
//!
//! Readers that want to wake up on publish instead of polling can
//! [`subscribe`](FrameSlot::subscribe) to change notifications.

use tokio::sync::watch;

use super::frame::Frame;

/// Single-item, overwrite-on-write holder for one camera's latest frame
#[derive(Debug)]
pub struct FrameSlot {
    tx: watch::Sender<Option<Frame>>,
}

impl FrameSlot {
    /// Create an empty slot
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    /// Replace the held frame
    ///
    /// Works from any thread, with or without a runtime, and whether or not
    /// anyone is watching.
    pub fn publish(&self, frame: Frame) {
        self.tx.send_replace(Some(frame));
    }

    /// The current frame, or `None` if nothing was ever published
    pub fn snapshot(&self) -> Option<Frame> {
        self.tx.borrow().clone()
    }

    /// Whether the slot has never received a frame
    pub fn is_empty(&self) -> bool {
        self.tx.borrow().is_none()
    }

    /// Receive change notifications for this slot
    ///
    /// The receiver reports the slot as closed once the slot is dropped.
    pub fn subscribe(&self) -> watch::Receiver<Option<Frame>> {
        self.tx.subscribe()
    }
}

impl Default for FrameSlot {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    use chrono::Local;
    use image::{Rgb, RgbImage};

    use super::*;

    fn solid(seq: u64) -> Frame {
        let value = (seq % 251) as u8;
        Frame::new(seq, Local::now(), RgbImage::from_pixel(32, 24, Rgb([value; 3])))
    }

    #[test]
    fn test_empty_until_first_publish() {
        let slot = FrameSlot::new();
        assert!(slot.is_empty());
        assert!(slot.snapshot().is_none());

        slot.publish(solid(1));
        assert!(!slot.is_empty());
        assert_eq!(slot.snapshot().unwrap().seq(), 1);
    }

    #[test]
    fn test_latest_wins() {
        let slot = FrameSlot::new();
        for seq in 1..=5 {
            slot.publish(solid(seq));
        }

        assert_eq!(slot.snapshot().unwrap().seq(), 5);
    }

    #[test]
    fn test_never_empty_again() {
        let slot = FrameSlot::new();
        slot.publish(solid(1));

        for seq in 2..50 {
            assert!(slot.snapshot().is_some());
            slot.publish(solid(seq));
            assert!(slot.snapshot().is_some());
        }
    }

    #[test]
    fn test_snapshot_is_never_torn() {
        let slot = Arc::new(FrameSlot::new());
        let done = Arc::new(AtomicBool::new(false));

        let writer = {
            let slot = Arc::clone(&slot);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                for seq in 1..=2_000 {
                    slot.publish(solid(seq));
                }
                done.store(true, Ordering::SeqCst);
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let slot = Arc::clone(&slot);
                let done = Arc::clone(&done);
                thread::spawn(move || {
                    let mut last_seq = 0;
                    while !done.load(Ordering::SeqCst) {
                        if let Some(frame) = slot.snapshot() {
                            let expected = (frame.seq() % 251) as u8;
                            assert!(frame.image().pixels().all(|p| p.0 == [expected; 3]));
                            // single writer: observed sequence never goes backwards
                            assert!(frame.seq() >= last_seq);
                            last_seq = frame.seq();
                        }
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(slot.snapshot().unwrap().seq(), 2_000);
    }

    #[tokio::test]
    async fn test_subscribe_wakes_on_publish() {
        let slot = Arc::new(FrameSlot::new());
        let mut rx = slot.subscribe();

        let publisher = Arc::clone(&slot);
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            publisher.publish(solid(9));
        });

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().as_ref().map(Frame::seq), Some(9));
    }

    #[tokio::test]
    async fn test_subscriber_sees_close() {
        let slot = FrameSlot::new();
        let mut rx = slot.subscribe();
        drop(slot);

        assert!(rx.changed().await.is_err());
    }
}
