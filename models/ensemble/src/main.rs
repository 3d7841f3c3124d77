use std::{
	env,
	fs::read,
	io::Cursor,
	process::ExitCode
};

use brgkit_models_ensemble::{
	brg::import::{
		BrgImportError,
		ImportCfg
	},
	event::LogSink,
	BrgModel
};

fn main() -> ExitCode {
	env_logger::init();

	let cfg = ImportCfg::default();
	let mut failed = false;

	for path in env::args().skip(1) {
		let model = read(&path)
			.map_err(BrgImportError::from)
			.and_then(|raw| BrgModel::read(&mut Cursor::new(raw), &cfg, &mut LogSink));

		match model {
			Ok(model) => println!("{}: {:#?}", path, model),
			Err(e) => {
				log::error!("{}: {}", path, e);
				failed = true;
			},
		}
	}

	if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}
