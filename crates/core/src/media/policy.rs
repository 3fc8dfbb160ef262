//! Immutable extension and codec tables that drive every planning decision.

use serde::{Deserialize, Serialize};

use super::naming::{split_name, FileClass};

/// Which stream drives the directive when a file carries several streams of
/// the same class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamSelection {
    /// The last stream of the class wins.
    #[default]
    Last,
    /// The first stream of the class wins.
    First,
}

/// Extension allow-lists and delivery targets.
///
/// All extension and codec comparisons are case-insensitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaPolicy {
    /// Extensions treated as video containers.
    #[serde(default = "default_video_extensions")]
    pub video_extensions: Vec<String>,

    /// Extensions treated as standalone subtitle files.
    #[serde(default = "default_subtitle_extensions")]
    pub subtitle_extensions: Vec<String>,

    /// Video containers that are already browser-playable and left untouched.
    #[serde(default = "default_accepted_containers")]
    pub accepted_containers: Vec<String>,

    /// Container (extension) every converted video is written to.
    #[serde(default = "default_primary_container")]
    pub primary_container: String,

    /// Extension of the canonical text subtitle format.
    #[serde(default = "default_subtitle_format")]
    pub subtitle_format: String,

    /// Encoder used to write the canonical subtitle format.
    #[serde(default = "default_subtitle_encoder")]
    pub subtitle_encoder: String,

    /// Video codec (as reported by the prober) that can be passed through.
    #[serde(default = "default_target_video_codec")]
    pub target_video_codec: String,

    /// Encoder used when video has to be re-encoded.
    #[serde(default = "default_video_encoder")]
    pub video_encoder: String,

    /// Audio codec (as reported by the prober) that can be passed through.
    #[serde(default = "default_target_audio_codec")]
    pub target_audio_codec: String,

    /// Encoder used when audio has to be re-encoded.
    #[serde(default = "default_audio_encoder")]
    pub audio_encoder: String,

    /// Image-based subtitle codecs that cannot become text subtitles.
    #[serde(default = "default_bitmap_subtitle_codecs")]
    pub bitmap_subtitle_codecs: Vec<String>,

    /// Stream selection when several video or audio streams are present.
    #[serde(default)]
    pub stream_selection: StreamSelection,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_video_extensions() -> Vec<String> {
    strings(&[
        "mkv", "avi", "mp4", "m4v", "mov", "wmv", "flv", "webm", "mpg", "mpeg", "ts",
    ])
}

fn default_subtitle_extensions() -> Vec<String> {
    strings(&["srt", "vtt", "ass", "ssa", "sub"])
}

fn default_accepted_containers() -> Vec<String> {
    strings(&["mp4", "webm"])
}

fn default_primary_container() -> String {
    "mp4".to_string()
}

fn default_subtitle_format() -> String {
    "vtt".to_string()
}

fn default_subtitle_encoder() -> String {
    "webvtt".to_string()
}

fn default_target_video_codec() -> String {
    "h264".to_string()
}

fn default_video_encoder() -> String {
    "libx264".to_string()
}

fn default_target_audio_codec() -> String {
    "aac".to_string()
}

fn default_audio_encoder() -> String {
    "aac".to_string()
}

fn default_bitmap_subtitle_codecs() -> Vec<String> {
    strings(&["hdmv_pgs_subtitle", "dvd_subtitle", "dvb_subtitle", "xsub"])
}

impl Default for MediaPolicy {
    fn default() -> Self {
        Self {
            video_extensions: default_video_extensions(),
            subtitle_extensions: default_subtitle_extensions(),
            accepted_containers: default_accepted_containers(),
            primary_container: default_primary_container(),
            subtitle_format: default_subtitle_format(),
            subtitle_encoder: default_subtitle_encoder(),
            target_video_codec: default_target_video_codec(),
            video_encoder: default_video_encoder(),
            target_audio_codec: default_target_audio_codec(),
            audio_encoder: default_audio_encoder(),
            bitmap_subtitle_codecs: default_bitmap_subtitle_codecs(),
            stream_selection: StreamSelection::default(),
        }
    }
}

fn contains_ignore_case(list: &[String], value: &str) -> bool {
    list.iter().any(|item| item.eq_ignore_ascii_case(value))
}

impl MediaPolicy {
    /// Classifies a file name by its extension.
    pub fn classify(&self, filename: &str) -> FileClass {
        let (_, extension) = split_name(filename);
        if extension.is_empty() {
            FileClass::Ignored
        } else if contains_ignore_case(&self.video_extensions, extension) {
            FileClass::Video
        } else if contains_ignore_case(&self.subtitle_extensions, extension) {
            FileClass::Subtitle
        } else {
            FileClass::Ignored
        }
    }

    /// Whether a video with this extension is already in a playable container.
    pub fn is_accepted_container(&self, extension: &str) -> bool {
        contains_ignore_case(&self.accepted_containers, extension)
    }

    /// Whether a subtitle file with this extension is already canonical.
    pub fn is_canonical_subtitle(&self, extension: &str) -> bool {
        self.subtitle_format.eq_ignore_ascii_case(extension)
    }

    /// Whether a subtitle codec is image based.
    pub fn is_bitmap_subtitle(&self, codec: &str) -> bool {
        contains_ignore_case(&self.bitmap_subtitle_codecs, codec)
    }

    pub fn is_target_video_codec(&self, codec: &str) -> bool {
        self.target_video_codec.eq_ignore_ascii_case(codec)
    }

    pub fn is_target_audio_codec(&self, codec: &str) -> bool {
        self.target_audio_codec.eq_ignore_ascii_case(codec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_default_policy() {
        let policy = MediaPolicy::default();
        assert_eq!(policy.classify("movie.mkv"), FileClass::Video);
        assert_eq!(policy.classify("movie.avi"), FileClass::Video);
        assert_eq!(policy.classify("movie.mp4"), FileClass::Video);
        assert_eq!(policy.classify("movie.srt"), FileClass::Subtitle);
        assert_eq!(policy.classify("movie.vtt"), FileClass::Subtitle);
        assert_eq!(policy.classify("cover.jpg"), FileClass::Ignored);
        assert_eq!(policy.classify("README"), FileClass::Ignored);
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        let policy = MediaPolicy::default();
        assert_eq!(policy.classify("MOVIE.MKV"), FileClass::Video);
        assert_eq!(policy.classify("Movie.Srt"), FileClass::Subtitle);
    }

    #[test]
    fn test_classify_uses_last_extension_only() {
        let policy = MediaPolicy::default();
        assert_eq!(policy.classify("show.mkv.part"), FileClass::Ignored);
        assert_eq!(policy.classify("show.srt.mkv"), FileClass::Video);
    }

    #[test]
    fn test_classify_with_substituted_tables() {
        let policy = MediaPolicy {
            video_extensions: strings(&["ogv"]),
            subtitle_extensions: strings(&["txt"]),
            ..Default::default()
        };
        assert_eq!(policy.classify("clip.ogv"), FileClass::Video);
        assert_eq!(policy.classify("clip.txt"), FileClass::Subtitle);
        assert_eq!(policy.classify("clip.mkv"), FileClass::Ignored);
    }

    #[test]
    fn test_codec_checks() {
        let policy = MediaPolicy::default();
        assert!(policy.is_target_video_codec("h264"));
        assert!(!policy.is_target_video_codec("hevc"));
        assert!(policy.is_target_audio_codec("AAC"));
        assert!(!policy.is_target_audio_codec("mp3"));
        assert!(policy.is_bitmap_subtitle("hdmv_pgs_subtitle"));
        assert!(!policy.is_bitmap_subtitle("subrip"));
        assert!(policy.is_accepted_container("webm"));
        assert!(!policy.is_accepted_container("mkv"));
        assert!(policy.is_canonical_subtitle("VTT"));
    }

    #[test]
    fn test_policy_deserialize_partial() {
        let toml = r#"
primary_container = "webm"
accepted_containers = ["webm"]
stream_selection = "first"
"#;
        let policy: MediaPolicy = toml::from_str(toml).unwrap();
        assert_eq!(policy.primary_container, "webm");
        assert_eq!(policy.stream_selection, StreamSelection::First);
        // Untouched tables keep their defaults
        assert_eq!(policy.target_video_codec, "h264");
        assert!(policy.subtitle_extensions.contains(&"srt".to_string()));
    }
}
