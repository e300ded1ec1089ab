//! Codec id to file extension lookup.
//!
//! Several Matroska codec ids share one raw-stream extension (both PCM byte
//! orders extract to `wav`, VP8 and VP9 both to `ivf`), so the table maps
//! each extension to a set of codec ids. Entries ending in `/` are family
//! prefixes (`A_REAL/` covers `A_REAL/COOK`, `A_REAL/28_8`, ...).

/// Extension to codec id table.
pub const CODEC_EXTENSIONS: &[(&str, &[&str])] = &[
    // Audio
    ("ac3", &["A_AC3"]),
    ("eac3", &["A_EAC3"]),
    ("mp2", &["A_MPEG/L2"]),
    ("mp3", &["A_MPEG/L3"]),
    ("dts", &["A_DTS"]),
    ("wav", &["A_PCM/INT/LIT", "A_PCM/INT/BIG"]),
    ("flac", &["A_FLAC"]),
    ("caf", &["A_ALAC"]),
    ("oga", &["A_VORBIS"]),
    ("opus", &["A_OPUS"]),
    ("aac", &["A_AAC", "A_AAC/"]),
    ("ra", &["A_REAL/"]),
    ("mlp", &["A_MLP"]),
    ("thd", &["A_TRUEHD"]),
    ("tta", &["A_TTA1"]),
    ("wv", &["A_WAVPACK4"]),
    // Video
    ("avi", &["V_MS/VFW/FOURCC"]),
    ("h264", &["V_MPEG4/ISO/AVC"]),
    ("h265", &["V_MPEGH/ISO/HEVC"]),
    ("rv", &["V_REAL/"]),
    ("m1v", &["V_MPEG1"]),
    ("m2v", &["V_MPEG2"]),
    ("ogv", &["V_THEORA"]),
    ("ivf", &["V_VP8", "V_VP9"]),
    // Subtitles
    ("srt", &["S_TEXT/UTF8", "S_TEXT/ASCII"]),
    ("ssa", &["S_TEXT/SSA", "S_SSA"]),
    ("ass", &["S_TEXT/ASS", "S_ASS"]),
    ("sub", &["S_VOBSUB"]),
    ("usf", &["S_TEXT/USF"]),
    ("ogx", &["S_KATE"]),
    ("sup", &["S_HDMV/PGS"]),
    ("textst", &["S_HDMV/TEXTST"]),
    ("vtt", &["S_TEXT/WEBVTT"]),
];

/// Returns the extension for a codec id, choosing the most specific entry.
///
/// An exact match always wins. Otherwise the longest prefix entry (one that
/// ends in `/`) covering the id is used.
pub fn extension_for(codec_id: &str) -> Option<&'static str> {
    let mut best: Option<(&'static str, usize)> = None;

    for (ext, ids) in CODEC_EXTENSIONS {
        for id in ids.iter() {
            if *id == codec_id {
                return Some(*ext);
            }
            if id.ends_with('/') && codec_id.starts_with(*id) {
                let len = id.len();
                if best.map_or(true, |(_, best_len)| len > best_len) {
                    best = Some((*ext, len));
                }
            }
        }
    }

    best.map(|(ext, _)| ext)
}

/// Returns every codec id registered under an extension.
pub fn codec_ids_for(extension: &str) -> &'static [&'static str] {
    CODEC_EXTENSIONS
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, ids)| *ids)
        .unwrap_or(&[])
}
