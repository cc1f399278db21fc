//! Line-driven state machine that assembles a [`Feature`].

use bdd_outline_patterns::{
    ClassifiedLine, LineKind, StepType, classify_line, indent_width, parse_tags, split_cells,
    strip_comment,
};
use log::{debug, trace, warn};

use crate::error::{ExampleTableError, ParseError, StructuralError};
use crate::model::{Background, ExampleSet, Feature, Orientation, Scenario, Step, Tags};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Feature,
    Scenario,
    Background,
    Examples,
    ExamplesVertical,
    ExampleHeader,
    ExampleRows,
    ExampleVerticalRows,
    Step(StepType),
    Tag,
}

impl Mode {
    fn from_kind(kind: LineKind) -> Option<Self> {
        let mode = match kind {
            LineKind::Feature => Self::Feature,
            LineKind::Scenario | LineKind::ScenarioOutline => Self::Scenario,
            LineKind::ExamplesVertical => Self::ExamplesVertical,
            LineKind::Examples => Self::Examples,
            LineKind::Background => Self::Background,
            LineKind::Given | LineKind::When | LineKind::Then => Self::Step(kind.step_type()?),
            LineKind::Tag => Self::Tag,
            LineKind::Continue => return None,
        };
        Some(mode)
    }

    fn is_step(self) -> bool {
        matches!(self, Self::Step(_))
    }

    /// Modes after which a step may appear while no scenario is open.
    fn opens_background_step(self) -> bool {
        matches!(
            self,
            Self::Background | Self::Step(StepType::Given | StepType::When)
        )
    }
}

#[derive(Debug, Clone, Copy)]
enum StepTarget {
    Background,
    Scenario,
}

#[derive(Debug, Clone, Copy)]
struct OpenStep {
    target: StepTarget,
    indent: usize,
}

pub(crate) struct FeatureBuilder {
    feature: Feature,
    path: String,
    scenario: Option<String>,
    mode: Option<Mode>,
    prev_mode: Option<Mode>,
    description: Vec<String>,
    open_step: Option<OpenStep>,
    multiline: bool,
    prev_line: Option<String>,
    scenario_examples: Option<ExampleSet>,
    feature_examples: Option<ExampleSet>,
}

impl FeatureBuilder {
    pub(crate) fn new(feature: Feature, path: String) -> Self {
        Self {
            feature,
            path,
            scenario: None,
            mode: None,
            prev_mode: None,
            description: Vec::new(),
            open_step: None,
            multiline: false,
            prev_line: None,
            scenario_examples: None,
            feature_examples: None,
        }
    }

    pub(crate) fn build(mut self, text: &str) -> Result<Feature, ParseError> {
        for (idx, line) in text.lines().enumerate() {
            self.feed(idx + 1, line)?;
        }
        self.finish()
    }

    fn feed(&mut self, line_no: usize, raw: &str) -> Result<(), ParseError> {
        if self.capture_continuation(raw) {
            return Ok(());
        }
        let clean = strip_comment(raw);
        if clean.is_empty() && self.prev_mode != Some(Mode::Feature) {
            return Ok(());
        }
        let classified = classify_line(clean);
        trace!("line {line_no}: {:?} {clean:?}", classified.kind);

        let mut kind = classified.kind;
        if kind == Some(LineKind::Continue) {
            if !self.mode.is_some_and(Mode::is_step) {
                return Err(self.structural("cannot safely determine line mode", line_no, clean));
            }
            kind = None;
        }
        let declared = kind.and_then(Mode::from_kind);
        self.mode = declared.or(self.mode);

        if self.scenario.is_none()
            && !self.prev_mode.is_some_and(Mode::opens_background_step)
            && self.mode.is_some_and(Mode::is_step)
        {
            return Err(self.structural(
                "step definition outside of a Scenario or a Background",
                line_no,
                clean,
            ));
        }
        if self.mode == Some(Mode::Feature) {
            self.feature_line(line_no, clean, &classified)?;
        }
        self.prev_mode = self.mode;

        match self.mode {
            Some(Mode::Scenario) if declared.is_some() => {
                self.start_scenario(line_no, clean, &classified)?;
            }
            Some(Mode::Scenario) => {
                if let Some(scenario) = self.current_scenario_mut() {
                    append_line(&mut scenario.description, clean);
                }
            }
            Some(Mode::Background) if declared.is_some() => self.start_background(line_no),
            Some(Mode::Background) => {
                if let Some(background) = self.feature.background.as_mut() {
                    append_line(&mut background.description, clean);
                }
            }
            Some(Mode::Examples) => {
                self.start_examples(Orientation::Horizontal, line_no)?;
                self.mode = Some(Mode::ExampleHeader);
            }
            Some(Mode::ExamplesVertical) => {
                self.start_examples(Orientation::Vertical, line_no)?;
                self.mode = Some(Mode::ExampleVerticalRows);
            }
            Some(Mode::ExampleHeader) => {
                self.set_header(classified.text);
                self.mode = Some(Mode::ExampleRows);
            }
            Some(Mode::ExampleRows) => self.add_row(line_no, raw.trim())?,
            Some(Mode::ExampleVerticalRows) => self.add_vertical_row(line_no, raw.trim())?,
            Some(Mode::Step(step_type)) => self.add_step(line_no, raw, step_type, &classified)?,
            Some(Mode::Feature | Mode::Tag) | None => {}
        }
        self.prev_line = Some(clean.to_string());
        Ok(())
    }

    fn finish(mut self) -> Result<Feature, ParseError> {
        self.open_step = None;
        self.flush_scenario_examples()?;
        self.flush_feature_examples()?;
        self.feature.description = self.description.join("\n").trim().to_string();
        debug!(
            "parsed feature {:?} from {} with {} scenario(s)",
            self.feature.name().unwrap_or_default(),
            self.path,
            self.feature.scenarios().len()
        );
        Ok(self.feature)
    }

    /// Append `raw` to the open step when it continues it.
    fn capture_continuation(&mut self, raw: &str) -> bool {
        let Some(open) = self.open_step else {
            return false;
        };
        if indent_width(raw) > open.indent || (raw.trim().is_empty() && self.multiline) {
            self.multiline = true;
            if let Some(step) = self.steps_mut(open.target).and_then(|s| s.last_mut()) {
                step.add_line(raw);
            }
            return true;
        }
        self.open_step = None;
        self.multiline = false;
        false
    }

    fn feature_line(
        &mut self,
        line_no: usize,
        clean: &str,
        classified: &ClassifiedLine<'_>,
    ) -> Result<(), ParseError> {
        match self.prev_mode {
            None | Some(Mode::Tag) if self.feature.name.is_none() => {
                self.feature.name = Some(classified.text.to_string());
                self.feature.line = line_no;
                self.feature.tags = self.preceding_tags();
            }
            Some(Mode::Feature) => self.description.push(clean.to_string()),
            _ => {
                return Err(self.structural("multiple features in one document", line_no, clean));
            }
        }
        Ok(())
    }

    fn start_scenario(
        &mut self,
        line_no: usize,
        clean: &str,
        classified: &ClassifiedLine<'_>,
    ) -> Result<(), ParseError> {
        self.flush_scenario_examples()?;
        self.flush_feature_examples()?;
        let stepless = self
            .current_scenario_mut()
            .filter(|open| open.steps.is_empty())
            .map(|open| open.name.clone());
        if let Some(name) = stepless {
            let message = format!("scenario \"{name}\" has no steps of its own");
            return Err(self.structural(&message, line_no, clean));
        }
        let scenario = Scenario::new(
            classified.text,
            classified.keyword,
            line_no,
            self.preceding_tags(),
        );
        debug!("registered scenario {:?} at line {line_no}", scenario.name());
        if let Some(previous) = self.feature.scenarios.insert(scenario) {
            warn!(
                "scenario {:?} at line {line_no} replaces the one declared at line {} in {}",
                previous.name(),
                previous.line(),
                self.path
            );
        }
        self.scenario = Some(classified.text.to_string());
        Ok(())
    }

    fn start_background(&mut self, line_no: usize) {
        if let Some(previous) = self.feature.background.replace(Background::new(line_no)) {
            warn!(
                "background at line {line_no} replaces the one declared at line {} in {}",
                previous.line(),
                self.path
            );
        }
    }

    fn start_examples(&mut self, orientation: Orientation, line_no: usize) -> Result<(), ParseError> {
        let block = ExampleSet::new(orientation, line_no);
        if self.scenario.is_some() {
            self.flush_scenario_examples()?;
            self.scenario_examples = Some(block);
        } else {
            self.flush_feature_examples()?;
            self.feature_examples = Some(block);
        }
        Ok(())
    }

    fn open_block_mut(&mut self) -> Option<&mut ExampleSet> {
        if self.scenario.is_some() {
            self.scenario_examples.as_mut()
        } else {
            self.feature_examples.as_mut()
        }
    }

    fn set_header(&mut self, text: &str) {
        if let Some(block) = self.open_block_mut() {
            block.names = split_cells(text)
                .into_iter()
                .filter(|cell| !cell.is_empty())
                .collect();
        }
    }

    fn add_row(&mut self, line_no: usize, row: &str) -> Result<(), ParseError> {
        let cells = split_cells(row);
        let path = self.path.clone();
        let Some(block) = self.open_block_mut() else {
            return Ok(());
        };
        if cells.len() != block.names.len() {
            return Err(ExampleTableError::RaggedRow {
                expected: block.names.len(),
                found: cells.len(),
                line: line_no,
                line_text: row.to_string(),
                path,
            }
            .into());
        }
        block.values.push(cells);
        Ok(())
    }

    fn add_vertical_row(&mut self, line_no: usize, row: &str) -> Result<(), ParseError> {
        let mut cells = split_cells(row).into_iter();
        let path = self.path.clone();
        let Some(name) = cells.next() else {
            return Err(ExampleTableError::MissingVerticalName {
                line: line_no,
                line_text: row.to_string(),
                path,
            }
            .into());
        };
        let Some(block) = self.open_block_mut() else {
            return Ok(());
        };
        if block.names.contains(&name) {
            return Err(ExampleTableError::DuplicateVerticalName {
                name,
                line: line_no,
                path,
            }
            .into());
        }
        block.names.push(name);
        block.values.push(cells.collect());
        Ok(())
    }

    fn add_step(
        &mut self,
        line_no: usize,
        raw: &str,
        step_type: StepType,
        classified: &ClassifiedLine<'_>,
    ) -> Result<(), ParseError> {
        let step = Step::new(
            step_type,
            classified.keyword,
            classified.text,
            indent_width(raw),
            line_no,
        )
        .map_err(|source| ExampleTableError::Param {
            source,
            step: classified.text.to_string(),
            line: line_no,
            path: self.path.clone(),
        })?;
        let target = if self.feature.background.is_some() && self.scenario.is_none() {
            StepTarget::Background
        } else {
            StepTarget::Scenario
        };
        let Some(steps) = self.steps_mut(target) else {
            return Err(self.structural(
                "step definition outside of a Scenario or a Background",
                line_no,
                classified.text,
            ));
        };
        steps.push(step);
        self.open_step = Some(OpenStep {
            target,
            indent: indent_width(raw),
        });
        self.multiline = false;
        Ok(())
    }

    fn steps_mut(&mut self, target: StepTarget) -> Option<&mut Vec<Step>> {
        match target {
            StepTarget::Background => self.feature.background.as_mut().map(|b| &mut b.steps),
            StepTarget::Scenario => self.current_scenario_mut().map(|s| &mut s.steps),
        }
    }

    fn current_scenario_mut(&mut self) -> Option<&mut Scenario> {
        let name = self.scenario.as_deref()?;
        self.feature.scenarios.get_mut(name)
    }

    fn flush_scenario_examples(&mut self) -> Result<(), ParseError> {
        let Some(block) = self.scenario_examples.take() else {
            return Ok(());
        };
        if let Some(block) = self.checked_block(block)? {
            if let Some(scenario) = self.current_scenario_mut() {
                debug!(
                    "flushed examples from line {} into scenario {:?}",
                    block.line(),
                    scenario.name()
                );
                scenario.examples.push(block);
            }
        }
        Ok(())
    }

    fn flush_feature_examples(&mut self) -> Result<(), ParseError> {
        let Some(block) = self.feature_examples.take() else {
            return Ok(());
        };
        if let Some(block) = self.checked_block(block)? {
            debug!("flushed feature examples from line {}", block.line());
            self.feature.examples.push(block);
        }
        Ok(())
    }

    /// Drop blocks without values and reject ragged vertical blocks.
    fn checked_block(&self, block: ExampleSet) -> Result<Option<ExampleSet>, ExampleTableError> {
        if block.is_empty() {
            return Ok(None);
        }
        if block.orientation() == Orientation::Vertical {
            let mut columns = block.names.iter().zip(&block.values);
            if let Some((first, first_values)) = columns.next() {
                if let Some((name, values)) =
                    columns.find(|(_, values)| values.len() != first_values.len())
                {
                    return Err(ExampleTableError::RaggedVertical {
                        first: first.clone(),
                        name: name.clone(),
                        expected: first_values.len(),
                        found: values.len(),
                        line: block.line(),
                        path: self.path.clone(),
                    });
                }
            }
        }
        Ok(Some(block))
    }

    fn preceding_tags(&self) -> Tags {
        self.prev_line
            .as_deref()
            .filter(|line| line.starts_with('@'))
            .map(parse_tags)
            .map(Tags::from)
            .unwrap_or_default()
    }

    fn structural(&self, message: &str, line: usize, text: &str) -> ParseError {
        StructuralError {
            message: message.to_string(),
            line,
            line_text: text.to_string(),
            path: self.path.clone(),
        }
        .into()
    }
}

fn append_line(target: &mut String, line: &str) {
    if !target.is_empty() {
        target.push('\n');
    }
    target.push_str(line);
}
