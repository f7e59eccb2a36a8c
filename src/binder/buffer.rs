use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::binder::surface::{ChartHandle, ChartSpec, Region, RegionContent, Surface};
use crate::config::DisplayConfig;
use crate::output::chart::render_bar_chart;
use crate::output::table::{render_grid, render_notice};

#[derive(Debug, Clone, Default, PartialEq)]
struct RegionState {
    visible: bool,
    content: Option<RegionContent>,
}

#[derive(Debug, Clone, PartialEq)]
struct LiveChart {
    region: Region,
    spec: ChartSpec,
}

#[derive(Debug, Clone)]
pub struct BufferedSurface {
    regions: BTreeMap<Region, RegionState>,
    charts: BTreeMap<u64, LiveChart>,
    next_chart_id: u64,
    released_charts: usize,
    chart_width: usize,
}

impl BufferedSurface {
    pub fn new(available: impl IntoIterator<Item = Region>, chart_width: usize) -> Self {
        let regions = available
            .into_iter()
            .map(|region| {
                // Sections start hidden until something is rendered into them.
                let visible = !matches!(
                    region,
                    Region::ResultSection | Region::ChartsSection | Region::HistorySection
                );
                (
                    region,
                    RegionState {
                        visible,
                        content: None,
                    },
                )
            })
            .collect();
        Self {
            regions,
            charts: BTreeMap::new(),
            next_chart_id: 1,
            released_charts: 0,
            chart_width: chart_width.max(1),
        }
    }

    pub fn with_all_regions(chart_width: usize) -> Self {
        Self::new(Region::ALL, chart_width)
    }

    pub fn from_display(display: &DisplayConfig) -> Self {
        let hidden: BTreeSet<Region> = display.hidden().into_iter().collect();
        Self::new(
            Region::ALL.into_iter().filter(|r| !hidden.contains(r)),
            display.chart_width,
        )
    }

    pub fn content(&self, region: Region) -> Option<&RegionContent> {
        self.regions.get(&region)?.content.as_ref()
    }

    pub fn is_visible(&self, region: Region) -> bool {
        self.regions.get(&region).is_some_and(|state| state.visible)
    }

    pub fn chart_in(&self, region: Region) -> Option<&ChartSpec> {
        self.charts
            .values()
            .find(|chart| chart.region == region)
            .map(|chart| &chart.spec)
    }

    pub fn live_charts(&self) -> usize {
        self.charts.len()
    }

    pub fn released_charts(&self) -> usize {
        self.released_charts
    }

    fn shown(&self, region: Region) -> bool {
        self.is_visible(region) && self.is_visible(region.section())
    }

    pub fn render(&self) -> String {
        let mut blocks = Vec::new();
        for (region, state) in &self.regions {
            if !self.shown(*region) {
                continue;
            }
            if let Some(content) = &state.content {
                blocks.push(render_content(content));
            }
            for chart in self.charts.values().filter(|c| c.region == *region) {
                blocks.push(render_bar_chart(&chart.spec, self.chart_width));
            }
        }
        blocks.join("\n\n")
    }
}

impl Surface for BufferedSurface {
    fn has_region(&self, region: Region) -> bool {
        self.regions.contains_key(&region)
    }

    fn write(&mut self, region: Region, content: RegionContent) {
        if let Some(state) = self.regions.get_mut(&region) {
            state.content = Some(content);
        }
    }

    fn clear(&mut self, region: Region) {
        if let Some(state) = self.regions.get_mut(&region) {
            state.content = None;
        }
    }

    fn set_visible(&mut self, region: Region, visible: bool) {
        if let Some(state) = self.regions.get_mut(&region) {
            state.visible = visible;
        }
    }

    fn create_chart(&mut self, region: Region, spec: ChartSpec) -> Option<ChartHandle> {
        if !self.has_region(region) {
            return None;
        }
        let id = self.next_chart_id;
        self.next_chart_id += 1;
        self.charts.insert(id, LiveChart { region, spec });
        Some(ChartHandle::new(id, region))
    }

    fn destroy_chart(&mut self, handle: ChartHandle) {
        if self.charts.remove(&handle.id()).is_some() {
            self.released_charts += 1;
        } else {
            debug!("chart {} on {} was already gone", handle.id(), handle.region());
        }
    }
}

fn render_content(content: &RegionContent) -> String {
    match content {
        RegionContent::Text { lines } => lines.join("\n"),
        RegionContent::Notice { kind, message } => render_notice(*kind, message),
        RegionContent::Table { header, rows } => render_grid(header, rows),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::surface::ChartSeries;

    fn quantity_chart() -> ChartSpec {
        ChartSpec {
            title: "Quantity".to_string(),
            labels: vec!["Oats".to_string()],
            series: vec![ChartSeries {
                label: "Quantity".to_string(),
                values: vec![2.0],
            }],
        }
    }

    #[test]
    fn writes_to_missing_regions_are_dropped() {
        let mut surface = BufferedSurface::new([Region::Status], 20);
        surface.write(Region::ResultSummary, RegionContent::text("ignored"));
        assert!(surface.content(Region::ResultSummary).is_none());
        assert!(surface.create_chart(Region::ChartsSection, quantity_chart()).is_none());
    }

    #[test]
    fn hidden_sections_are_not_rendered() {
        let mut surface = BufferedSurface::with_all_regions(20);
        surface.write(Region::ResultSummary, RegionContent::text("Targets: ..."));
        surface.write(Region::Status, RegionContent::text("ready"));
        assert_eq!(surface.render(), "ready");

        surface.set_visible(Region::ResultSection, true);
        assert!(surface.render().contains("Targets: ..."));
    }

    #[test]
    fn display_config_removes_regions() {
        let display = DisplayConfig {
            hidden_regions: vec!["charts-section".to_string()],
            chart_width: 10,
        };
        let surface = BufferedSurface::from_display(&display);
        assert!(!surface.has_region(Region::ChartsSection));
        assert!(surface.has_region(Region::ResultTable));
    }

    #[test]
    fn destroying_a_chart_releases_it() {
        let mut surface = BufferedSurface::with_all_regions(20);
        let handle = surface
            .create_chart(Region::ChartsSection, quantity_chart())
            .expect("chart");
        assert_eq!(surface.live_charts(), 1);
        surface.destroy_chart(handle);
        assert_eq!(surface.live_charts(), 0);
        assert_eq!(surface.released_charts(), 1);
    }
}
