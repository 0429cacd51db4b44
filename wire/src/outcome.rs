/// Result of feeding one chunk of frontend bytes through the framer (§4.8,
/// §6). `Success` reports how many input bytes the framer consumed; the
/// caller slices those off its read buffer and keeps the rest for the next
/// call. `NoCompleteCommand` means "come back with more bytes, nothing
/// consumed" — the defensive length-prefix decoding of §4.8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireOutcome {
    Success { consumed: usize },
    NoCompleteCommand,
    Close,
    NoBuf,
}
