// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.
 */

/// The configuration file read when `--config` isn't given.
pub const DEFAULT_CONFIG_FILE: &str = "./config.cfg";

/// Every command that is run (and every filesystem change) gets recorded here
/// unless the user says otherwise.
pub const DEFAULT_CODE_LOG_FILE: &str = "executed_commands.log";

/// The WSClean executable used when `[global] wsclean` isn't set.
pub const DEFAULT_WSCLEAN: &str = "wsclean";

/// Arguments that always precede `-c` when running CASA non-interactively.
pub const CASA_BATCH_ARGS: [&str; 3] = ["--nogui", "--nologger", "--nologfile"];

/// CASA script that divides the data column by the model column.
pub const DIVIDE_MODEL_SCRIPT: &str = "divide_model.py";

/// CASA script that shifts a dataset's phase centre.
pub const ADJUST_PHASE_CENTRE_SCRIPT: &str = "adjust_phase_center.py";

/// Phase-centre offset handed to the recentering script after model division.
pub const RECENTRE_OFFSET: [f64; 2] = [0.0, 0.0];

/// The column that CASA tasks read from and write to.
pub const DATA_COLUMN: &str = "data";

/// Suffix of the intermediate copy made while splitting.
pub const TMP_SUFFIX: &str = "tmp";

/// Suffix of the listobs summary that accompanies every dataset we create.
pub const LISTOBS_SUFFIX: &str = "listobs.txt";

/// Extension of measurement sets.
pub const MS_EXTENSION: &str = "ms";
