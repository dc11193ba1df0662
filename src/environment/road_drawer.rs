use console_engine::pixel;
use console_engine::pixel::Pixel;
use console_engine::screen::Screen;
use itertools::Itertools;

use crate::environment::road_environment::RoadSnapshot;
use crate::ql::prelude::DebugVisualizer;

const CAR: char = '●';
const OBSTACLE: char = 'x';
const GOAL: char = '□';
const LANE: char = '·';

impl DebugVisualizer for RoadSnapshot {
    fn one_line_info(&self) -> String {
        let blocked_ahead = self
            .obstacles
            .iter()
            .filter(|&&(p, _)| p > self.position)
            .map(|(p, l)| format!("{}/L{}", p, l))
            .join(" ");
        format!(
            "Road: car at {} on lane {}, goal-distance: {}, obstacles ahead: [{}]",
            self.position,
            self.lane,
            self.goal.saturating_sub(self.position),
            blocked_ahead
        )
    }

    /// One row per lane, one column per road position
    fn render_to_console(&self) -> Screen {
        let mut screen = Screen::new_fill(self.length as u32, self.lanes as u32, pixel::pxl(LANE));

        for lane in 0..self.lanes {
            for position in 0..self.length {
                let pixel: Option<Pixel> = if position == self.position && lane == self.lane {
                    Some(pixel::pxl(CAR))
                } else if self.obstacles.contains(position, lane) {
                    Some(pixel::pxl(OBSTACLE))
                } else if position == self.goal {
                    Some(pixel::pxl(GOAL))
                } else {
                    None
                };
                if let Some(pixel) = pixel {
                    screen.set_pxl(position as i32, lane as i32, pixel);
                }
            }
        }
        screen
    }
}

#[cfg(test)]
mod tests {
    use crate::environment::road_environment::{Obstacles, GOAL as GOAL_POSITION, NUM_LANES, ROAD_LENGTH};

    use super::*;

    fn snapshot() -> RoadSnapshot {
        RoadSnapshot {
            position: 4,
            lane: 1,
            obstacles: [(5, 1), (9, 0)].into_iter().collect::<Obstacles>(),
            goal: GOAL_POSITION,
            length: ROAD_LENGTH,
            lanes: NUM_LANES,
        }
    }

    #[test]
    fn test_render_road() {
        let screen = snapshot().render_to_console();
        assert_eq!(screen.get_width(), ROAD_LENGTH as u32);
        assert_eq!(screen.get_height(), NUM_LANES as u32);
        let chr = |x: usize, y: usize| screen.get_pxl(x as i32, y as i32).map(|p| p.chr).unwrap();
        assert_eq!(chr(4, 1), CAR);
        assert_eq!(chr(5, 1), OBSTACLE);
        assert_eq!(chr(9, 0), OBSTACLE);
        assert_eq!(chr(GOAL_POSITION, 2), GOAL);
        assert_eq!(chr(0, 0), LANE);
    }

    #[test]
    fn test_one_line_info() {
        let info = snapshot().one_line_info();
        assert_eq!(info, "Road: car at 4 on lane 1, goal-distance: 10, obstacles ahead: [5/L1 9/L0]");
    }
}
