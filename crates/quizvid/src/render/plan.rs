//! Render plan and FFmpeg command construction.
//!
//! Every segment of the timeline becomes a `lavfi` color source with a chain
//! of `drawtext` filters; segments are joined with `xfade`. Text is written
//! to small files in the work directory and referenced with `textfile=`,
//! which keeps arbitrary quiz text out of the filter graph syntax.

use super::filter::{enable_between, escape_filter_value, ffmpeg_color, secs};
use crate::error::QuizResult;
use crate::model::{Question, Quiz};
use crate::settings::{OutputFormat, Quality, RenderConfig, VideoSettings};
use crate::subtitles::option_label;
use crate::template::Template;
use crate::timeline::{PhaseKind, Segment, SegmentKind, Timeline};
use crate::tts::TtsClip;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// Everything needed to produce one video
#[derive(Debug, Clone)]
pub struct RenderPlan {
    /// Arranged quiz (shuffling already applied)
    pub quiz: Quiz,
    /// Effective video settings (template applied)
    pub settings: VideoSettings,
    /// Template supplying accent and highlight colors
    pub template: Template,
    /// Segment schedule
    pub timeline: Timeline,
    /// Output container
    pub format: OutputFormat,
    /// Encoding quality
    pub quality: Quality,
    /// Directory for text files, narration and subtitles
    pub work_dir: PathBuf,
    /// Output video
    pub output: PathBuf,
    /// Narration clips
    pub tts_clips: Vec<TtsClip>,
    /// Background music file
    pub music: Option<PathBuf>,
    /// SRT file to mux as a soft subtitle track
    pub subtitles: Option<PathBuf>,
}

impl RenderPlan {
    /// Plan without audio or subtitles
    #[must_use]
    pub fn new(
        quiz: Quiz,
        settings: VideoSettings,
        template: Template,
        format: OutputFormat,
        quality: Quality,
        work_dir: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
    ) -> Self {
        let timeline = Timeline::build(&quiz, &settings);
        Self {
            quiz,
            settings,
            template,
            timeline,
            format,
            quality,
            work_dir: work_dir.into(),
            output: output.into(),
            tts_clips: Vec::new(),
            music: None,
            subtitles: None,
        }
    }

    /// Add narration clips
    #[must_use]
    pub fn with_tts_clips(mut self, clips: Vec<TtsClip>) -> Self {
        self.tts_clips = clips;
        self
    }

    /// Add background music
    #[must_use]
    pub fn with_music(mut self, music: impl Into<PathBuf>) -> Self {
        self.music = Some(music.into());
        self
    }

    /// Add a subtitle track
    #[must_use]
    pub fn with_subtitles(mut self, subtitles: impl Into<PathBuf>) -> Self {
        self.subtitles = Some(subtitles.into());
        self
    }

    /// Derived render configuration
    #[must_use]
    pub fn render_config(&self) -> RenderConfig {
        RenderConfig::from_settings(&self.settings, self.format)
    }

    /// Video length in seconds
    #[must_use]
    pub fn total_duration(&self) -> f64 {
        self.timeline.total_duration()
    }

    /// Whether the output carries an audio stream
    #[must_use]
    pub fn has_audio(&self) -> bool {
        !self.tts_clips.is_empty() || self.music.is_some()
    }

    /// Text files referenced by the filter graph, with their contents
    #[must_use]
    pub fn text_files(&self) -> Vec<(PathBuf, String)> {
        self.timeline
            .segments
            .iter()
            .enumerate()
            .flat_map(|(k, segment)| overlays(self, k, segment))
            .map(|o| (self.work_dir.join(&o.file), o.text))
            .collect()
    }

    /// Write the text files into the work directory
    pub fn write_text_files(&self) -> QuizResult<()> {
        std::fs::create_dir_all(&self.work_dir)?;
        for (path, text) in self.text_files() {
            std::fs::write(path, text)?;
        }
        Ok(())
    }
}

struct Overlay {
    file: String,
    text: String,
    size: u32,
    color: String,
    x: String,
    y: String,
    highlight: Option<String>,
    window: Option<(f64, f64)>,
    expand: bool,
}

impl Overlay {
    fn new(file: String, text: String, size: u32, color: &str) -> Self {
        Self {
            file,
            text,
            size,
            color: color.to_string(),
            x: "(w-text_w)/2".to_string(),
            y: "(h-text_h)/2".to_string(),
            highlight: None,
            window: None,
            expand: false,
        }
    }

    fn at(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.x = x.into();
        self.y = y.into();
        self
    }

    fn during(mut self, start: f64, end: f64) -> Self {
        self.window = Some((start, end));
        self
    }

    fn drawtext(&self, work_dir: &Path, font: &str) -> String {
        let path = work_dir.join(&self.file);
        let mut filter = format!(
            "drawtext=textfile={}:expansion={}:font={}:fontsize={}:fontcolor={}:x={}:y={}",
            escape_filter_value(&path.to_string_lossy()),
            if self.expand { "normal" } else { "none" },
            escape_filter_value(font),
            self.size,
            ffmpeg_color(&self.color),
            self.x,
            self.y,
        );
        if let Some(color) = &self.highlight {
            let _ = write!(
                filter,
                ":box=1:boxcolor={}@0.25:boxborderw={}",
                ffmpeg_color(color),
                (self.size / 3).max(1)
            );
        }
        if let Some((start, end)) = self.window {
            let _ = write!(filter, ":enable={}", enable_between(start, end));
        }
        filter
    }
}

struct Sizes {
    title: u32,
    prompt: u32,
    option: u32,
    small: u32,
    margin: u32,
}

impl Sizes {
    fn new(settings: &VideoSettings) -> Self {
        let scale = settings.resolution.scale();
        let base = f64::from(settings.font_size) * scale;
        let px = |factor: f64| (base * factor).round() as u32;
        Self {
            title: px(3.0),
            prompt: px(2.0),
            option: px(1.5),
            small: px(1.1),
            margin: (60.0 * scale).round() as u32,
        }
    }
}

/// Greedy word wrap at `width` characters
fn wrap_text(text: &str, width: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines.join("\n")
}

fn chars_per_line(frame_width: u32, font_size: u32) -> usize {
    let usable = f64::from(frame_width) * 0.8;
    ((usable / (f64::from(font_size) * 0.55)) as usize).max(10)
}

fn overlays(plan: &RenderPlan, k: usize, segment: &Segment) -> Vec<Overlay> {
    let sizes = Sizes::new(&plan.settings);
    let (width, height) = plan.settings.resolution.dimensions();
    let h = f64::from(height);
    let y_at = |fraction: f64| format!("{}", (h * fraction).round() as u32);
    let text_color = plan.settings.text_color.as_str();
    let accent = plan.template.accent_color.as_str();
    let mut slot = 0;
    let mut name = || {
        slot += 1;
        format!("seg{k:02}_{slot:02}.txt")
    };

    let mut out = Vec::new();
    match segment.kind {
        SegmentKind::Intro => {
            let title = wrap_text(plan.quiz.title(), chars_per_line(width, sizes.title));
            out.push(Overlay::new(name(), title, sizes.title, text_color).at("(w-text_w)/2", y_at(0.32)));

            let description = plan.quiz.metadata.description.trim();
            if !description.is_empty() {
                let text = wrap_text(description, chars_per_line(width, sizes.option));
                out.push(Overlay::new(name(), text, sizes.option, text_color).at("(w-text_w)/2", y_at(0.52)));
            }

            let count = plan.quiz.question_count();
            let summary = format!(
                "{count} question{} · {} points",
                if count == 1 { "" } else { "s" },
                plan.quiz.total_points()
            );
            out.push(Overlay::new(name(), summary, sizes.small, accent).at("(w-text_w)/2", y_at(0.68)));
        }
        SegmentKind::Question { index } => {
            let Some(question) = plan.quiz.questions.get(index) else {
                return out;
            };
            question_overlays(plan, question, index, segment, &sizes, width, &mut name, &mut out);
        }
    }
    out
}

#[allow(clippy::too_many_arguments)]
fn question_overlays(
    plan: &RenderPlan,
    question: &Question,
    index: usize,
    segment: &Segment,
    sizes: &Sizes,
    width: u32,
    name: &mut impl FnMut() -> String,
    out: &mut Vec<Overlay>,
) {
    let (_, height) = plan.settings.resolution.dimensions();
    let h = f64::from(height);
    let y_at = |fraction: f64| format!("{}", (h * fraction).round() as u32);
    let margin = sizes.margin;
    let text_color = plan.settings.text_color.as_str();
    let accent = plan.template.accent_color.as_str();
    let correct = plan.template.correct_color.as_str();

    let header = format!("Question {} of {}", index + 1, plan.quiz.question_count());
    out.push(Overlay::new(name(), header, sizes.small, accent).at(margin.to_string(), margin.to_string()));

    let footer = format!("{} pts · {}", question.points(), question.difficulty);
    out.push(
        Overlay::new(name(), footer, sizes.small, accent)
            .at(format!("w-text_w-{margin}"), format!("h-text_h-{margin}")),
    );

    let prompt = wrap_text(&question.question, chars_per_line(width, sizes.prompt));
    out.push(Overlay::new(name(), prompt, sizes.prompt, text_color).at("(w-text_w)/2", y_at(0.16)));

    let reveal = segment.phase(PhaseKind::Reveal).map(|p| (p.start, segment.duration));
    let option_x = format!("{}", (f64::from(width) * 0.18).round() as u32);
    let option_y = |i: usize| {
        format!(
            "{}",
            (h * 0.38 + i as f64 * f64::from(sizes.option) * 2.0).round() as u32
        )
    };

    for (i, option) in question.options.iter().enumerate() {
        let text = format!("{}) {option}", option_label(i));
        out.push(Overlay::new(name(), text.clone(), sizes.option, text_color).at(option_x.clone(), option_y(i)));

        if let (Some((start, end)), Some(true)) = (reveal, question.correct_index().map(|c| c == i)) {
            let mut highlight = Overlay::new(name(), text, sizes.option, correct)
                .at(option_x.clone(), option_y(i))
                .during(start, end);
            highlight.highlight = Some(correct.to_string());
            out.push(highlight);
        }
    }

    if question.options.is_empty() {
        if let Some((start, end)) = reveal {
            let answer = format!("Answer: {}", question.correct_text().unwrap_or(""));
            let mut overlay = Overlay::new(name(), answer, sizes.option, correct)
                .at("(w-text_w)/2", y_at(0.5))
                .during(start, end);
            overlay.highlight = Some(correct.to_string());
            out.push(overlay);
        }
    }

    if let Some((start, end)) = segment.countdown {
        let mut countdown = Overlay::new(
            name(),
            format!("%{{eif:ceil({}-t):d}}", secs(end)),
            sizes.title,
            accent,
        )
        .at(format!("w-text_w-{margin}"), margin.to_string())
        .during(start, end);
        countdown.expand = true;
        out.push(countdown);
    }

    if let (Some(phase), Some(explanation)) =
        (segment.phase(PhaseKind::Explanation), question.explanation())
    {
        let text = wrap_text(explanation, chars_per_line(width, sizes.small));
        out.push(
            Overlay::new(name(), text, sizes.small, text_color)
                .at("(w-text_w)/2", y_at(0.8))
                .during(phase.start, phase.end),
        );
    }
}

fn push_all(args: &mut Vec<String>, items: &[&str]) {
    args.extend(items.iter().map(|s| (*s).to_string()));
}

/// Build the full FFmpeg argument list for a plan.
///
/// Input order: one color source per segment, then narration clips, then
/// background music, then the subtitle file.
#[must_use]
pub fn build_ffmpeg_args(plan: &RenderPlan) -> Vec<String> {
    let (width, height) = plan.settings.resolution.dimensions();
    let fps = plan.settings.fps;
    let background = ffmpeg_color(&plan.settings.background_color);
    let total = plan.total_duration();
    let segments = &plan.timeline.segments;

    let mut args = Vec::new();
    push_all(&mut args, &["-hide_banner", "-progress", "pipe:1", "-nostats", "-y"]);

    for segment in segments {
        push_all(&mut args, &["-f", "lavfi", "-i"]);
        args.push(format!(
            "color=c={background}:s={width}x{height}:r={fps}:d={}",
            secs(segment.duration)
        ));
    }

    let mut next_input = segments.len();
    let mut audio_inputs = Vec::new();
    for clip in &plan.tts_clips {
        args.push("-i".to_string());
        args.push(clip.path.to_string_lossy().to_string());
        audio_inputs.push((next_input, Some(clip.start)));
        next_input += 1;
    }
    if let Some(music) = &plan.music {
        push_all(&mut args, &["-stream_loop", "-1", "-i"]);
        args.push(music.to_string_lossy().to_string());
        audio_inputs.push((next_input, None));
        next_input += 1;
    }
    let subtitle_input = plan.subtitles.as_ref().map(|path| {
        args.push("-i".to_string());
        args.push(path.to_string_lossy().to_string());
        next_input
    });

    let mut graph = Vec::new();
    for (k, segment) in segments.iter().enumerate() {
        let mut chain: Vec<String> = overlays(plan, k, segment)
            .iter()
            .map(|o| o.drawtext(&plan.work_dir, &plan.settings.text_font))
            .collect();
        chain.push("format=yuv420p".to_string());
        graph.push(format!("[{k}:v]{}[v{k}]", chain.join(",")));
    }

    if segments.len() <= 1 {
        graph.push("[v0]null[vout]".to_string());
    } else {
        let transition = plan.settings.transitions.xfade_name();
        let mut previous = "v0".to_string();
        for (k, segment) in segments.iter().enumerate().skip(1) {
            let label = if k + 1 == segments.len() {
                "vout".to_string()
            } else {
                format!("x{k}")
            };
            graph.push(format!(
                "[{previous}][v{k}]xfade=transition={transition}:duration={}:offset={}[{label}]",
                secs(plan.timeline.transition),
                secs(segment.start)
            ));
            previous = label;
        }
    }

    if !audio_inputs.is_empty() {
        let mut labels = Vec::new();
        for (n, (input, start)) in audio_inputs.iter().enumerate() {
            match start {
                Some(start) => {
                    let ms = (start * 1000.0).round() as u64;
                    graph.push(format!("[{input}:a]adelay=delays={ms}:all=1[a{n}]"));
                }
                None => graph.push(format!(
                    "[{input}:a]volume={}[a{n}]",
                    plan.render_config().audio.music_volume
                )),
            }
            labels.push(format!("[a{n}]"));
        }
        graph.push(format!(
            "{}amix=inputs={}:duration=longest:normalize=0,atrim=end={},apad=whole_dur={}[aout]",
            labels.concat(),
            labels.len(),
            secs(total),
            secs(total)
        ));
    }

    args.push("-filter_complex".to_string());
    args.push(graph.join(";"));

    push_all(&mut args, &["-map", "[vout]"]);
    if !audio_inputs.is_empty() {
        push_all(&mut args, &["-map", "[aout]"]);
    }
    if let Some(input) = subtitle_input {
        args.push("-map".to_string());
        args.push(format!("{input}:s"));
    }

    args.push("-c:v".to_string());
    args.push(plan.format.video_codec().to_string());
    match plan.format {
        OutputFormat::Mp4 | OutputFormat::Mkv => {
            args.push("-preset".to_string());
            args.push(plan.quality.x264_preset().to_string());
            args.push("-crf".to_string());
            args.push(plan.quality.crf().to_string());
        }
        OutputFormat::Webm => {
            args.push("-crf".to_string());
            args.push(plan.quality.crf().to_string());
            push_all(&mut args, &["-b:v", "0", "-cpu-used"]);
            args.push(plan.quality.vp9_cpu_used().to_string());
            push_all(&mut args, &["-row-mt", "1"]);
        }
    }
    push_all(&mut args, &["-pix_fmt", "yuv420p", "-r"]);
    args.push(fps.to_string());

    if audio_inputs.is_empty() {
        args.push("-an".to_string());
    } else {
        args.push("-c:a".to_string());
        args.push(plan.format.audio_codec().to_string());
        args.push("-b:a".to_string());
        args.push(
            match plan.format {
                OutputFormat::Webm => "128k",
                OutputFormat::Mp4 | OutputFormat::Mkv => "192k",
            }
            .to_string(),
        );
    }

    if subtitle_input.is_some() {
        args.push("-c:s".to_string());
        args.push(plan.format.subtitle_codec().to_string());
    }
    if plan.format == OutputFormat::Mp4 {
        push_all(&mut args, &["-movflags", "+faststart"]);
    }

    args.push("-t".to_string());
    args.push(secs(total));
    args.push(plan.output.to_string_lossy().to_string());
    args
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::settings::{Resolution, Transition};
    use crate::template::{TemplateRegistry, DEFAULT_TEMPLATE};

    fn quiz() -> Quiz {
        Quiz::new("Capitals")
            .with_description("Europe edition")
            .with_question(
                Question::multiple_choice("Capital of France?", ["Berlin", "Paris"], 1)
                    .with_duration(5)
                    .with_explanation("Paris since 987"),
            )
            .with_question(Question::short_answer("Capital of Chile?", "Santiago"))
    }

    fn plan(format: OutputFormat) -> RenderPlan {
        let template = TemplateRegistry::with_builtins()
            .get(DEFAULT_TEMPLATE)
            .unwrap()
            .clone();
        RenderPlan::new(
            quiz(),
            VideoSettings::default(),
            template,
            format,
            Quality::Medium,
            "/tmp/work",
            format!("/tmp/out/capitals.{}", format.extension()),
        )
    }

    fn filter_graph(args: &[String]) -> &str {
        let at = args.iter().position(|a| a == "-filter_complex").unwrap();
        &args[at + 1]
    }

    #[test]
    fn test_global_flags_first_output_last() {
        let args = build_ffmpeg_args(&plan(OutputFormat::Mp4));
        assert_eq!(&args[..5], ["-hide_banner", "-progress", "pipe:1", "-nostats", "-y"]);
        assert_eq!(args.last().unwrap(), "/tmp/out/capitals.mp4");
    }

    #[test]
    fn test_one_color_input_per_segment() {
        let args = build_ffmpeg_args(&plan(OutputFormat::Mp4));
        let lavfi = args.iter().filter(|a| *a == "lavfi").count();
        assert_eq!(lavfi, 3);
        assert!(args.contains(&"color=c=0x1a1a1a:s=1920x1080:r=30:d=3.000".to_string()));
        assert!(args.contains(&"color=c=0x1a1a1a:s=1920x1080:r=30:d=11.000".to_string()));
    }

    #[test]
    fn test_xfade_offsets_follow_timeline() {
        let p = plan(OutputFormat::Mp4);
        let args = build_ffmpeg_args(&p);
        let graph = filter_graph(&args);
        assert!(graph.contains("[v0][v1]xfade=transition=fade:duration=1.000:offset=2.000[x1]"));
        assert!(graph.contains("[x1][v2]xfade=transition=fade:duration=1.000:offset=12.000[vout]"));
    }

    #[test]
    fn test_transition_mapping() {
        let mut p = plan(OutputFormat::Mp4);
        p.settings.transitions = Transition::Wipe;
        let args = build_ffmpeg_args(&p);
        assert!(filter_graph(&args).contains("xfade=transition=wipeleft"));
    }

    #[test]
    fn test_drawtext_phases() {
        let args = build_ffmpeg_args(&plan(OutputFormat::Mp4));
        let graph = filter_graph(&args);
        assert!(graph.contains("textfile=/tmp/work/seg01_03.txt:expansion=none:font=Arial"));
        assert!(graph.contains(":box=1:boxcolor=0x22c55e@0.25"));
        assert!(graph.contains(":enable='between(t,5.000,11.000)'"));
        assert!(graph.contains(":expansion=normal"));
    }

    #[test]
    fn test_text_files_content() {
        let files = plan(OutputFormat::Mp4).text_files();
        let texts: Vec<&str> = files.iter().map(|(_, t)| t.as_str()).collect();
        assert!(texts.contains(&"Capitals"));
        assert!(texts.contains(&"Question 1 of 2"));
        assert!(texts.contains(&"B) Paris"));
        assert!(texts.contains(&"Answer: Santiago"));
        assert!(texts.contains(&"Paris since 987"));
        assert!(texts.contains(&"%{eif:ceil(5.000-t):d}"));
        assert!(files.iter().all(|(p, _)| p.starts_with("/tmp/work")));
    }

    #[test]
    fn test_mp4_codec_flags() {
        let args = build_ffmpeg_args(&plan(OutputFormat::Mp4));
        let joined = args.join(" ");
        assert!(joined.contains("-c:v libx264 -preset medium -crf 23"));
        assert!(joined.contains("-movflags +faststart"));
        assert!(joined.contains("-an"));
        assert!(joined.contains("-t 25.000"));
    }

    #[test]
    fn test_webm_codec_flags() {
        let mut p = plan(OutputFormat::Webm);
        p.quality = Quality::High;
        let joined = build_ffmpeg_args(&p).join(" ");
        assert!(joined.contains("-c:v libvpx-vp9 -crf 18 -b:v 0 -cpu-used 1"));
        assert!(!joined.contains("faststart"));
    }

    #[test]
    fn test_audio_graph() {
        let p = plan(OutputFormat::Mp4)
            .with_tts_clips(vec![TtsClip {
                path: PathBuf::from("/tmp/work/tts_001.wav"),
                start: 2.0,
            }])
            .with_music("/music/loop.mp3");
        let args = build_ffmpeg_args(&p);
        let joined = args.join(" ");
        assert!(joined.contains("-i /tmp/work/tts_001.wav"));
        assert!(joined.contains("-stream_loop -1 -i /music/loop.mp3"));
        let graph = filter_graph(&args);
        assert!(graph.contains("[3:a]adelay=delays=2000:all=1[a0]"));
        assert!(graph.contains("[4:a]volume=0.3[a1]"));
        assert!(graph.contains("[a0][a1]amix=inputs=2"));
        assert!(joined.contains("-map [aout]"));
        assert!(joined.contains("-c:a aac"));
    }

    #[test]
    fn test_subtitle_track() {
        let p = plan(OutputFormat::Mkv).with_subtitles("/tmp/work/quiz.srt");
        let joined = build_ffmpeg_args(&p).join(" ");
        assert!(joined.contains("-i /tmp/work/quiz.srt"));
        assert!(joined.contains("-map 3:s"));
        assert!(joined.contains("-c:s srt"));
    }

    #[test]
    fn test_resolution_scales_fonts() {
        let mut p = plan(OutputFormat::Mp4);
        p.settings.resolution = Resolution::Uhd;
        let graph = build_ffmpeg_args(&p);
        assert!(filter_graph(&graph).contains("fontsize=144"));
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("one two three four", 9), "one two\nthree\nfour");
        assert_eq!(wrap_text("short", 40), "short");
    }
}
