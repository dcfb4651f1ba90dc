// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Built-in LCM message definitions for Cassie controller logs.
//!
//! These mirror the dairlib and drake message types found in controller and
//! simulator logs. [`KNOWN_TYPES`] is the fixed priority order used when a new
//! channel is classified.

/// dairlib message definitions.
pub const DAIRLIB_TYPES: &str = r#"
package dairlib;

struct lcmt_robot_output {
  int64_t utime;
  int32_t num_positions;
  int32_t num_velocities;
  int32_t num_efforts;
  string position_names[num_positions];
  string velocity_names[num_velocities];
  string effort_names[num_efforts];
  double position[num_positions];
  double velocity[num_velocities];
  double effort[num_efforts];
  double imu_accel[3];
}

struct lcmt_robot_input {
  int64_t utime;
  int32_t num_efforts;
  string effort_names[num_efforts];
  double efforts[num_efforts];
}

struct lcmt_metadata {
  string description;
  string datetime;
  string git_dirty_flag;
  string name;
  string git_commit_hash;
}

struct lcmt_trajectory_block {
  string trajectory_name;
  int32_t num_points;
  int32_t num_datatypes;
  double time_vec[num_points];
  double datapoints[num_datatypes][num_points];
  string datatypes[num_datatypes];
}

struct lcmt_saved_traj {
  lcmt_metadata metadata;
  int32_t num_trajectories;
  lcmt_trajectory_block trajectories[num_trajectories];
  string trajectory_names[num_trajectories];
}

struct lcmt_dairlib_signal {
  int64_t utime;
  int32_t dim;
  double val[dim];
  string coord[dim];
}

struct lcmt_osc_tracking_data {
  string name;
  int32_t ydim;
  int32_t ydotdim;
  boolean is_active;
  double y[ydim];
  double y_des[ydim];
  double error_y[ydotdim];
  double ydot[ydotdim];
  double ydot_des[ydotdim];
  double error_ydot[ydotdim];
  double yddot_des[ydotdim];
  double yddot_command[ydotdim];
  double yddot_command_sol[ydotdim];
}

struct lcmt_osc_output {
  int64_t utime;
  double fsm_state;
  int32_t num_tracking_data;
  lcmt_osc_tracking_data tracking_data[num_tracking_data];
}

struct lcmt_pd_config {
  int64_t timestamp;
  int32_t num_joints;
  string joint_names[num_joints];
  double desired_position[num_joints];
  double desired_velocity[num_joints];
  double kp[num_joints];
  double kd[num_joints];
}

struct lcmt_contact {
  int64_t utime;
  int32_t num_contacts;
  string contact_names[num_contacts];
  boolean contact[num_contacts];
}
"#;

/// drake message definitions.
pub const DRAKE_TYPES: &str = r#"
package drake;

struct lcmt_point_pair_contact_info_for_viz {
  int64_t timestamp;
  string body1_name;
  string body2_name;
  double contact_point[3];
  double contact_force[3];
  double normal[3];
}

struct lcmt_contact_results_for_viz {
  int64_t timestamp;
  int32_t num_point_pair_contacts;
  lcmt_point_pair_contact_info_for_viz point_pair_contact_info[num_point_pair_contacts];
}
"#;

pub const ROBOT_OUTPUT: &str = "lcmt_robot_output";
pub const SAVED_TRAJ: &str = "lcmt_saved_traj";
pub const DAIRLIB_SIGNAL: &str = "lcmt_dairlib_signal";
pub const OSC_OUTPUT: &str = "lcmt_osc_output";
pub const PD_CONFIG: &str = "lcmt_pd_config";
pub const ROBOT_INPUT: &str = "lcmt_robot_input";
pub const CONTACT_RESULTS: &str = "lcmt_contact_results_for_viz";
pub const CONTACT: &str = "lcmt_contact";

/// Top-level types tried, in this order, against the first payload of a channel.
pub const KNOWN_TYPES: [&str; 8] = [
    ROBOT_OUTPUT,
    SAVED_TRAJ,
    DAIRLIB_SIGNAL,
    OSC_OUTPUT,
    PD_CONFIG,
    ROBOT_INPUT,
    CONTACT_RESULTS,
    CONTACT,
];

/// All built-in `.lcm` sources.
pub const SOURCES: [&str; 2] = [DAIRLIB_TYPES, DRAKE_TYPES];
